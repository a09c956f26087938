//! The rateless driver loop (`spec.md` §4.6): grow both sides' sketches one
//! iteration at a time, diff, attempt a peel, and ask for more until the
//! peel succeeds, a method-specific limit is hit, or `max_iterations` runs
//! out.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cell::Cell;
use crate::config::ReconcileConfig;
use crate::differ;
use crate::error::{ReconcileError, ReconcileResult};
use crate::hash::HashContext;
use crate::iblt::Iblt;
use crate::mapping::cache::RowCache;
use crate::mapping::{MappingGenerator, Method, MethodKind};
use crate::peel::{self, PeelResult};
use crate::transport::{AckReceiver, AckSender, CellReceiver, CellSender, ConfigReceiver, ConfigSender};
use crate::wire::Ack;

/// Progress snapshot exposed after every iteration, for callers that want to
/// log or make adaptive decisions (`spec.md`: "current diff magnitude" and
/// "last peel fraction" as observability signals, not protocol state).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationProgress {
    pub k: u32,
    pub current_diff_magnitude: i64,
    pub last_peel_fraction: f64,
    /// The method's claimed `|Delta|` decoding guarantee at this `k`, if any
    /// (`spec.md` §4.2's `decodability_guarantee` contract).
    pub guarantee_max_delta: Option<usize>,
}

/// `spec.md` §4.6 step d: once EGH's guarantee at `k` already covers the
/// diff magnitude estimated from `diff`, a peel attempt would be wasted work
/// if it hasn't opened yet — skip it and ask for more rows directly. Only
/// EGH's guarantee is unconditional (probability 1), so only EGH qualifies.
fn egh_free_zone_not_yet_open(method: &Method, diff: &[Cell], k: u32) -> bool {
    if method.kind() != MethodKind::Egh {
        return false;
    }
    let estimate = diff.iter().filter(|c| !c.is_empty()).count();
    match method.decodability_guarantee(k).max_delta {
        Some(max_delta) => estimate > max_delta,
        None => false,
    }
}

pub struct Reconciler {
    config: ReconcileConfig,
    method: Arc<Method>,
    ctx: Option<HashContext>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig, cache: Arc<RowCache>) -> Self {
        let method = Arc::new(Method::new(config.method, config.universe_size, cache));
        let ctx = (!config.superset_assumption)
            .then(|| HashContext::new(config.hash_variant, config.hash_seed));
        Self { config, method, ctx }
    }

    fn check_iteration_budget(&self, k: u32) -> ReconcileResult<()> {
        if k > self.config.max_iterations {
            return Err(ReconcileError::ResourceExhaustion(format!(
                "exceeded max_iterations={}",
                self.config.max_iterations
            )));
        }
        if let (MethodKind::Bch, Method::Bch(bch)) = (self.method.kind(), self.method.as_ref()) {
            if bch.exceeds_guarantee(k) {
                return Err(ReconcileError::MethodLimitExceeded(format!(
                    "BCH has no decoding guarantee past iteration {}",
                    (1u64 << bch.m().saturating_sub(1)) - 1
                )));
            }
        }
        Ok(())
    }

    /// Run the side that owns the authoritative `diff` computation: it
    /// receives the peer's growing batches, diffs against its own sketch,
    /// and decides each round whether to stop or ask for more.
    pub fn run_initiator<T>(&self, mine: &[u32], transport: &mut T) -> ReconcileResult<PeelResult>
    where
        T: CellReceiver + AckSender + ConfigSender + ConfigReceiver,
    {
        self.run_initiator_with_progress(mine, transport, |_| {})
    }

    /// Exchange configs with the peer and fail fast with
    /// [`ReconcileError::ConfigMismatch`] before either side commits any
    /// rows to the wire (`spec.md` §6: negotiated once at session start).
    /// Sends before receiving so neither side blocks waiting on the other.
    fn negotiate_config<T>(&self, transport: &mut T) -> ReconcileResult<()>
    where
        T: ConfigSender + ConfigReceiver,
    {
        transport.send_config(&self.config)?;
        let peer_config = transport.recv_config()?;
        self.config.check_compatible(&peer_config)
    }

    /// Same protocol as [`Reconciler::run_initiator`], additionally invoking
    /// `on_progress` after every iteration with `(k, current_diff_magnitude,
    /// last_peel_fraction)` — an observability signal only, never consulted
    /// by the driver itself, so callers can log or decide to give up early
    /// without the core imposing any timeout (`spec.md` §5).
    pub fn run_initiator_with_progress<T>(
        &self,
        mine: &[u32],
        transport: &mut T,
        mut on_progress: impl FnMut(IterationProgress),
    ) -> ReconcileResult<PeelResult>
    where
        T: CellReceiver + AckSender + ConfigSender + ConfigReceiver,
    {
        self.negotiate_config(transport)?;

        let mut mine_iblt = Iblt::new(self.method.clone(), self.ctx);
        let mut their_iblt = Iblt::new(self.method.clone(), self.ctx);
        let mut k = 0u32;

        loop {
            k += 1;
            self.check_iteration_budget(k)?;
            mine_iblt.extend_to(k, mine);

            let batch = transport.recv_batch()?;
            their_iblt.absorb_batch(&batch)?;

            let diff = differ::diff(mine_iblt.cells(), their_iblt.cells())?;
            let current_diff_magnitude: i64 = diff.iter().map(|c| c.counter.abs()).sum();
            let guarantee_max_delta = self.method.decodability_guarantee(k).max_delta;

            if egh_free_zone_not_yet_open(&self.method, &diff, k) {
                debug!(iteration = k, "EGH free zone not yet open, skipping peel attempt");
                on_progress(IterationProgress {
                    k,
                    current_diff_magnitude,
                    last_peel_fraction: 0.0,
                    guarantee_max_delta,
                });
                transport.send_ack(Ack::Continue)?;
                continue;
            }

            let mut diff_for_peel = diff.clone();
            match peel::peel(&mut diff_for_peel, &self.method, self.ctx.as_ref(), k) {
                Ok(result) => {
                    info!(iterations = k, cells_peeled = result.stats.cells_peeled, "reconciliation decoded");
                    on_progress(IterationProgress {
                        k,
                        current_diff_magnitude,
                        last_peel_fraction: 1.0,
                        guarantee_max_delta,
                    });
                    transport.send_ack(Ack::Stop)?;
                    return Ok(result);
                }
                Err(ReconcileError::DecodeIncomplete(stats)) => {
                    debug!(iteration = k, peeled = stats.cells_peeled, total = diff.len(), "requesting more rows");
                    let peel_fraction = if diff.is_empty() {
                        0.0
                    } else {
                        stats.cells_peeled as f64 / diff.len() as f64
                    };
                    on_progress(IterationProgress {
                        k,
                        current_diff_magnitude,
                        last_peel_fraction: peel_fraction,
                        guarantee_max_delta,
                    });
                    transport.send_ack(Ack::Continue)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Run the side that only ever grows its own sketch and ships batches
    /// on request, never attempting to decode locally.
    pub fn run_responder<T>(&self, theirs: &[u32], transport: &mut T) -> ReconcileResult<()>
    where
        T: CellSender + AckReceiver + ConfigSender + ConfigReceiver,
    {
        self.negotiate_config(transport)?;

        let mut iblt = Iblt::new(self.method.clone(), self.ctx);
        let mut k = 0u32;

        loop {
            k += 1;
            self.check_iteration_budget(k)?;
            iblt.extend_to(k, theirs);
            transport.send_batch(iblt.wire_batch(k))?;

            match transport.recv_ack()? {
                Ack::Stop => return Ok(()),
                Ack::Continue => continue,
            }
        }
    }
}

/// A direct, non-networked reconciliation convenient for tests and the
/// bundled demo: runs both sides' loops in lockstep against in-memory
/// symbol sets rather than over a transport.
pub fn reconcile_in_memory(
    mine: &[u32],
    theirs: &[u32],
    config: ReconcileConfig,
    cache: Arc<RowCache>,
) -> ReconcileResult<PeelResult> {
    let method = Arc::new(Method::new(config.method, config.universe_size, cache));
    let ctx =
        (!config.superset_assumption).then(|| HashContext::new(config.hash_variant, config.hash_seed));

    let mut mine_iblt = Iblt::new(method.clone(), ctx);
    let mut their_iblt = Iblt::new(method.clone(), ctx);
    let mut k = 0u32;

    loop {
        k += 1;
        if k > config.max_iterations {
            return Err(ReconcileError::ResourceExhaustion(format!(
                "exceeded max_iterations={}",
                config.max_iterations
            )));
        }
        if let (MethodKind::Bch, Method::Bch(bch)) = (method.kind(), method.as_ref()) {
            if bch.exceeds_guarantee(k) {
                return Err(ReconcileError::MethodLimitExceeded(
                    "BCH has no decoding guarantee at this depth".to_string(),
                ));
            }
        }

        mine_iblt.extend_to(k, mine);
        their_iblt.extend_to(k, theirs);

        let mut diff = differ::diff(mine_iblt.cells(), their_iblt.cells())?;
        if egh_free_zone_not_yet_open(&method, &diff, k) {
            continue;
        }

        match peel::peel(&mut diff, &method, ctx.as_ref(), k) {
            Ok(result) => return Ok(result),
            Err(ReconcileError::DecodeIncomplete(_)) => continue,
            Err(e) => return Err(e),
        }
    }
}
