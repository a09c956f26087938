use thiserror::Error;

/// Progress made by a peeling attempt that did not fully empty the sketch.
///
/// Carried by [`ReconcileError::DecodeIncomplete`] so a caller can log or
/// trace how close a failed attempt came without re-deriving it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodingStats {
    pub cells_peeled: usize,
    pub iterations: usize,
}

impl std::fmt::Display for DecodingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cells peeled over {} iterations",
            self.cells_peeled, self.iterations
        )
    }
}

/// Every error this crate can surface, grouped by the kinds `spec.md` §7
/// names: config/protocol mismatches are fatal, `DecodeIncomplete` is a
/// normal outcome the driver recovers from, and `MethodLimitExceeded` /
/// `ResourceExhaustion` are surfaced for the caller to act on.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("config mismatch: {0}")]
    ConfigMismatch(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("decode incomplete: {0}")]
    DecodeIncomplete(DecodingStats),

    #[error("method limit exceeded: {0}")]
    MethodLimitExceeded(String),

    #[error("resource exhaustion: {0}")]
    ResourceExhaustion(String),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
