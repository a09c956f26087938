//! Read-mostly memoization for mapping rows, shared across sessions that use
//! the same `(method, n)` (`spec.md` §5, §9: "a service object passed into
//! sessions").
//!
//! Readers take a shared [`parking_lot::RwLock`] read guard; a cache miss is
//! resolved by upgrading to a write guard, recomputing, and inserting —
//! giving the at-most-one-generation-per-key guarantee §5 requires without
//! ever blocking concurrent readers of already-cached entries.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::RwLock;

use super::gf2::Gf2mTable;

#[derive(Default)]
pub struct RowCache {
    /// Primes `p_1, p_2, ...` used by EGH, extended on demand. Independent
    /// of `n`, so shared by every EGH session regardless of universe size.
    egh_primes: RwLock<Vec<u64>>,
    /// GF(2^m) tables for BCH, keyed by `m`.
    gf_tables: RwLock<HashMap<u32, Arc<Gf2mTable>>>,
    /// IDM's higher-order combination rows: `C(2k, i)` subsets of
    /// `0..2k`, in ascending lexicographic order, keyed by `(k, i)`.
    idm_combinations: RwLock<HashMap<(u32, u32), Arc<Vec<Vec<u32>>>>>,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure at least `count` EGH primes are cached, returning a snapshot
    /// covering them. Extends the shared list by trial division against the
    /// primes already known.
    pub fn egh_primes(&self, count: usize) -> Vec<u64> {
        {
            let primes = self.egh_primes.read();
            if primes.len() >= count {
                return primes[..count].to_vec();
            }
        }
        let mut primes = self.egh_primes.write();
        if primes.is_empty() {
            primes.push(2);
        }
        let mut candidate = *primes.last().unwrap() + 1;
        while primes.len() < count {
            if primes.iter().take_while(|&&p| p * p <= candidate).all(|&p| candidate % p != 0) {
                primes.push(candidate);
            }
            candidate += 1;
        }
        primes[..count].to_vec()
    }

    pub fn gf_table(&self, m: u32) -> Arc<Gf2mTable> {
        if let Some(table) = self.gf_tables.read().get(&m) {
            return table.clone();
        }
        let mut tables = self.gf_tables.write();
        tables
            .entry(m)
            .or_insert_with(|| Arc::new(Gf2mTable::build(m)))
            .clone()
    }

    pub fn idm_combinations(&self, k: u32, i: u32) -> Arc<Vec<Vec<u32>>> {
        if let Some(combos) = self.idm_combinations.read().get(&(k, i)) {
            return combos.clone();
        }
        let mut cache = self.idm_combinations.write();
        cache
            .entry((k, i))
            .or_insert_with(|| {
                let combos: Vec<Vec<u32>> = (0..2 * k)
                    .combinations(i as usize)
                    .collect();
                Arc::new(combos)
            })
            .clone()
    }
}
