//! The growable sketch itself: a flat cell array that a [`Method`] indexes
//! into, extended one iteration's batch at a time (`spec.md` §4.3, §4.5).

use std::sync::Arc;

use crate::cell::Cell;
use crate::error::{ReconcileError, ReconcileResult};
use crate::hash::HashContext;
use crate::mapping::{MappingGenerator, Method};
use crate::wire::{WireBatch, WireCell};

/// An IBLT grown incrementally across iterations. Cells for iterations
/// `1..=k` sit contiguously in `cells`, at the offsets `method.rows_through`
/// gives; nothing is ever re-sized retroactively, only appended.
pub struct Iblt {
    method: Arc<Method>,
    ctx: Option<HashContext>,
    cells: Vec<Cell>,
    k: u32,
}

impl Iblt {
    pub fn new(method: Arc<Method>, ctx: Option<HashContext>) -> Self {
        Self {
            method,
            ctx,
            cells: Vec::new(),
            k: 0,
        }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn iteration_range(&self, i: u32) -> (usize, usize) {
        (self.method.rows_through(i - 1), self.method.rows_through(i))
    }

    /// Append cells for every iteration `self.k+1 ..= k`, inserting every
    /// symbol in `symbols` into the rows each one maps to in that iteration.
    /// Earlier iterations' cells are untouched — growth is strictly additive.
    pub fn extend_to(&mut self, k: u32, symbols: &[u32]) {
        for i in (self.k + 1)..=k {
            let (start, end) = self.iteration_range(i);
            self.cells.resize(end, Cell::new());
            for &s in symbols {
                for local in self.method.rows_for_symbol(s, i) {
                    self.cells[start + local].add(s as u64, self.ctx.as_ref());
                }
            }
        }
        self.k = self.k.max(k);
    }

    /// Encode iteration `i`'s cells as a wire batch. `i` must already have
    /// been grown via [`Iblt::extend_to`].
    pub fn wire_batch(&self, i: u32) -> WireBatch {
        let (start, end) = self.iteration_range(i);
        let cells = self.cells[start..end]
            .iter()
            .map(|cell| WireCell {
                counter: cell.counter,
                xor_sum: cell.xor_sum,
                checksum: self.ctx.is_some().then_some(cell.checksum),
            })
            .collect();
        WireBatch { iteration: i, cells }
    }

    /// Absorb a peer's wire batch as the next iteration's cells. The batch's
    /// `iteration` must be exactly one past what this IBLT already holds, and
    /// its row count must match what the shared method expects for it.
    pub fn absorb_batch(&mut self, batch: &WireBatch) -> ReconcileResult<()> {
        if batch.iteration != self.k + 1 {
            return Err(ReconcileError::ProtocolViolation(format!(
                "expected batch for iteration {}, got {}",
                self.k + 1,
                batch.iteration
            )));
        }
        let expected = self.method.rows_in_iteration(batch.iteration);
        if batch.cells.len() != expected {
            return Err(ReconcileError::ProtocolViolation(format!(
                "iteration {} expects {} rows, batch carried {}",
                batch.iteration,
                expected,
                batch.cells.len()
            )));
        }
        for wire_cell in &batch.cells {
            self.cells.push(Cell {
                counter: wire_cell.counter,
                xor_sum: wire_cell.xor_sum,
                checksum: wire_cell.checksum.unwrap_or(0),
            });
        }
        self.k = batch.iteration;
        Ok(())
    }
}
