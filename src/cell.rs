//! The three-accumulator cell algebra (`spec.md` §4.1).

use crate::hash::HashContext;

/// One slot of an IBLT: a signed count, an XOR-sum of the symbols it has
/// absorbed, and (when checksums are in use) an XOR-sum of their digests.
///
/// `checksum` stays at zero and is never read when the session runs under
/// the superset assumption — callers pass `None` for `ctx` in that case and
/// purity is then detected structurally from `counter`/`xor_sum` alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub counter: i64,
    pub xor_sum: u64,
    pub checksum: u64,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `symbol` into this cell.
    pub fn add(&mut self, symbol: u64, ctx: Option<&HashContext>) {
        self.xor_sum ^= symbol;
        self.counter += 1;
        if let Some(ctx) = ctx {
            self.checksum ^= ctx.hash(symbol);
        }
    }

    /// Insert every symbol in `symbols`, equivalent to calling [`Cell::add`]
    /// once per element in any order. Written as a fold so the optimizer is
    /// free to vectorize the XOR reduction (`spec.md` §4.1's "SHOULD use
    /// vectorized XOR reductions").
    pub fn add_many(&mut self, symbols: &[u64], ctx: Option<&HashContext>) {
        if symbols.is_empty() {
            return;
        }
        self.counter += symbols.len() as i64;
        self.xor_sum ^= symbols.iter().fold(0u64, |acc, s| acc ^ s);
        if let Some(ctx) = ctx {
            self.checksum ^= symbols.iter().fold(0u64, |acc, s| acc ^ ctx.hash(*s));
        }
    }

    /// Remove `symbol` from this cell.
    ///
    /// `counter` moves toward zero when nonzero (`counter -= sign(counter)`);
    /// the first removal recorded against an already-zero counter moves it
    /// to +1. This is the "signed stays signed" convention `spec.md` §9
    /// adopts for the differencing path, where negative counters legitimately
    /// arise from `B.counter - A.counter`.
    pub fn remove(&mut self, symbol: u64, ctx: Option<&HashContext>) {
        self.xor_sum ^= symbol;
        if let Some(ctx) = ctx {
            self.checksum ^= ctx.hash(symbol);
        }
        if self.counter > 0 {
            self.counter -= 1;
        } else if self.counter < 0 {
            self.counter += 1;
        } else {
            self.counter += 1;
        }
    }

    /// Fold `other` into `self`: `counter` adds, `xor_sum`/`checksum` XOR.
    /// Associative and commutative, so cells can be merged in any order.
    pub fn merge_xor(&mut self, other: &Cell) {
        self.counter += other.counter;
        self.xor_sum ^= other.xor_sum;
        self.checksum ^= other.checksum;
    }

    /// A pure cell holds exactly one symbol: its sign tells the peeling
    /// decoder which side contributed it, and `xor_sum` *is* that symbol.
    pub fn is_pure(&self, ctx: Option<&HashContext>) -> bool {
        if self.counter.unsigned_abs() != 1 || self.xor_sum == 0 {
            return false;
        }
        match ctx {
            Some(ctx) => self.checksum == ctx.hash(self.xor_sum),
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0 && self.xor_sum == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashVariant;

    #[test]
    fn add_then_remove_restores_prior_state() {
        let mut cell = Cell::new();
        let ctx = HashContext::new(HashVariant::Xxh64, 7);
        cell.add(42, Some(&ctx));
        cell.add(9, Some(&ctx));
        let before = cell;
        cell.add(1234, Some(&ctx));
        cell.remove(1234, Some(&ctx));
        assert_eq!(cell, before);
    }

    #[test]
    fn add_many_matches_repeated_add_in_any_order() {
        let ctx = HashContext::new(HashVariant::Xxh64, 3);
        let mut bulk = Cell::new();
        bulk.add_many(&[1, 2, 3, 4], Some(&ctx));

        let mut sequential = Cell::new();
        for s in [4, 1, 3, 2] {
            sequential.add(s, Some(&ctx));
        }
        assert_eq!(bulk, sequential);
    }

    #[test]
    fn pure_cell_detection() {
        let ctx = HashContext::new(HashVariant::Xxh64, 1);
        let mut cell = Cell::new();
        assert!(cell.is_empty());
        cell.add(5, Some(&ctx));
        assert!(cell.is_pure(Some(&ctx)));
        cell.add(6, Some(&ctx));
        assert!(!cell.is_pure(Some(&ctx)));
    }

    #[test]
    fn remove_on_zero_counter_goes_positive() {
        let mut cell = Cell::new();
        cell.remove(10, None);
        assert_eq!(cell.counter, 1);
        cell.remove(10, None);
        // xor_sum toggled back to 0, counter moves from 1 toward 0.
        assert_eq!(cell.counter, 0);
        assert!(cell.is_empty());
    }

    #[test]
    fn negative_counter_moves_toward_zero() {
        let mut cell = Cell {
            counter: -2,
            xor_sum: 0,
            checksum: 0,
        };
        cell.remove(99, None);
        assert_eq!(cell.counter, -1);
    }
}
