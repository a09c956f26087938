//! The peeling decoder (`spec.md` §4.5): repeatedly resolve pure cells and
//! subtract the symbol they reveal from every row it maps to, until the
//! sketch is empty or no pure cell remains.

use crate::cell::Cell;
use crate::error::{DecodingStats, ReconcileError, ReconcileResult};
use crate::hash::HashContext;
use crate::mapping::{MappingGenerator, Method};

/// Symbols recovered by a successful peel, split by which side contributed
/// them (`counter > 0` in the diff means "only in mine").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PeelResult {
    pub in_mine: Vec<u32>,
    pub in_theirs: Vec<u32>,
    pub stats: DecodingStats,
}

/// Peel `diff` in place. `k` is how many iterations of rows `diff` holds —
/// needed so a resolved symbol's contribution can be subtracted from every
/// row it was mapped to, not just the one it was found pure in.
pub fn peel(
    diff: &mut [Cell],
    method: &Method,
    ctx: Option<&HashContext>,
    k: u32,
) -> ReconcileResult<PeelResult> {
    let mut worklist: Vec<usize> = (0..diff.len()).filter(|&i| diff[i].is_pure(ctx)).collect();
    let mut result = PeelResult::default();

    while let Some(idx) = worklist.pop() {
        result.stats.iterations += 1;
        if !diff[idx].is_pure(ctx) {
            // already resolved as a side effect of peeling a row it shared.
            continue;
        }
        let cell = diff[idx];
        let symbol = cell.xor_sum as u32;
        if symbol < 1 || symbol > method.n() {
            return Err(ReconcileError::ProtocolViolation(format!(
                "pure cell revealed symbol {symbol}, outside universe [1, {}]",
                method.n()
            )));
        }
        if cell.counter > 0 {
            result.in_mine.push(symbol);
        } else {
            result.in_theirs.push(symbol);
        }
        result.stats.cells_peeled += 1;

        for row in method.column_support(symbol, k) {
            diff[row].remove(symbol as u64, ctx);
            if diff[row].is_pure(ctx) {
                worklist.push(row);
            }
        }
    }

    if diff.iter().all(Cell::is_empty) {
        Ok(result)
    } else {
        Err(ReconcileError::DecodeIncomplete(result.stats))
    }
}
