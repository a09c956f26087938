//! Cell-wise differencing between two digests (`spec.md` §4.4): the one
//! linear operation the whole protocol is built on top of.

use crate::cell::Cell;
use crate::error::{ReconcileError, ReconcileResult};

/// `mine - theirs`, cell by cell: `counter` subtracts, `xor_sum`/`checksum`
/// XOR (XOR is its own inverse, so "subtracting" an XOR accumulator is the
/// same as adding it). A symbol present only in `mine` surfaces with a
/// positive counter; one present only in `theirs`, negative.
pub fn diff(mine: &[Cell], theirs: &[Cell]) -> ReconcileResult<Vec<Cell>> {
    if mine.len() != theirs.len() {
        return Err(ReconcileError::ProtocolViolation(format!(
            "cell count mismatch: {} vs {}",
            mine.len(),
            theirs.len()
        )));
    }
    Ok(mine
        .iter()
        .zip(theirs)
        .map(|(a, b)| Cell {
            counter: a.counter - b.counter,
            xor_sum: a.xor_sum ^ b.xor_sum,
            checksum: a.checksum ^ b.checksum,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{HashContext, HashVariant};

    #[test]
    fn diff_of_identical_sketches_is_all_zero() {
        let ctx = HashContext::new(HashVariant::Xxh64, 1);
        let mut a = Cell::new();
        a.add_many(&[1, 2, 3], Some(&ctx));
        let mut b = Cell::new();
        b.add_many(&[1, 2, 3], Some(&ctx));
        let d = diff(&[a], &[b]).unwrap();
        assert!(d[0].is_empty());
    }

    #[test]
    fn symbol_only_in_mine_leaves_positive_pure_cell() {
        let ctx = HashContext::new(HashVariant::Xxh64, 1);
        let mut a = Cell::new();
        a.add_many(&[1, 2, 3], Some(&ctx));
        let mut b = Cell::new();
        b.add_many(&[1, 2], Some(&ctx));
        let d = diff(&[a], &[b]).unwrap();
        assert!(d[0].is_pure(Some(&ctx)));
        assert_eq!(d[0].counter, 1);
        assert_eq!(d[0].xor_sum, 3);
    }

    #[test]
    fn symbol_only_in_theirs_leaves_negative_pure_cell() {
        let ctx = HashContext::new(HashVariant::Xxh64, 1);
        let mut a = Cell::new();
        a.add_many(&[1, 2], Some(&ctx));
        let mut b = Cell::new();
        b.add_many(&[1, 2, 3], Some(&ctx));
        let d = diff(&[a], &[b]).unwrap();
        assert!(d[0].is_pure(Some(&ctx)));
        assert_eq!(d[0].counter, -1);
        assert_eq!(d[0].xor_sum, 3);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(diff(&[Cell::new()], &[Cell::new(), Cell::new()]).is_err());
    }
}
