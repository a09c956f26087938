//! Session configuration shared by both peers (`spec.md` §5).
//!
//! Every field here MUST match on both sides of a session before the first
//! batch is sent — a mismatch is a [`crate::error::ReconcileError::ConfigMismatch`],
//! not a silently-wrong reconciliation.

use serde::{Deserialize, Serialize};

use crate::hash::HashVariant;
use crate::mapping::MethodKind;

/// Parameters that must be agreed before a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    pub method: MethodKind,
    /// The shared universe size `n` both methods index against.
    pub universe_size: u32,
    /// When `true`, neither side emits or checks per-cell checksums: purity
    /// is detected from `counter`/`xor_sum` alone (`spec.md` §4.1, §9).
    pub superset_assumption: bool,
    pub hash_variant: HashVariant,
    /// Seed shared by both peers' [`crate::hash::HashContext`].
    pub hash_seed: u64,
    /// Hard ceiling on how many iterations a session will grow to before
    /// giving up with [`crate::error::ReconcileError::ResourceExhaustion`].
    pub max_iterations: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            method: MethodKind::Egh,
            universe_size: 1,
            superset_assumption: false,
            hash_variant: HashVariant::default(),
            hash_seed: 0,
            max_iterations: 64,
        }
    }
}

impl ReconcileConfig {
    /// Fails with [`crate::error::ReconcileError::ConfigMismatch`] when the
    /// two peers' configs disagree on anything that affects wire semantics.
    pub fn check_compatible(&self, other: &ReconcileConfig) -> Result<(), crate::error::ReconcileError> {
        if self != other {
            return Err(crate::error::ReconcileError::ConfigMismatch(format!(
                "local config {self:?} does not match peer config {other:?}"
            )));
        }
        Ok(())
    }

    /// Encode for the one-time config handshake (`spec.md` §6: negotiated
    /// once at session start). Unlike [`crate::wire`]'s per-iteration cell
    /// codec, this runs once per session, so `serde_json` is used rather
    /// than a hand-rolled layout.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::error::ReconcileError> {
        serde_json::to_vec(self)
            .map_err(|e| crate::error::ReconcileError::ProtocolViolation(format!("failed to encode config: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::error::ReconcileError> {
        serde_json::from_slice(bytes)
            .map_err(|e| crate::error::ReconcileError::ProtocolViolation(format!("failed to decode config: {e}")))
    }
}
