//! EGH: iteration `i` emits `p_i` rows (the `i`-th prime); symbol `s` hits
//! the row at local index `s mod p_i` (`spec.md` §4.2).

use std::sync::Arc;

use super::cache::RowCache;
use super::{Decodability, MappingGenerator};

pub struct Egh {
    n: u32,
    cache: Arc<RowCache>,
}

impl Egh {
    pub fn new(n: u32, cache: Arc<RowCache>) -> Self {
        Self { n, cache }
    }

    fn prime_at(&self, i: u32) -> u64 {
        self.cache.egh_primes(i as usize)[i as usize - 1]
    }
}

impl MappingGenerator for Egh {
    fn n(&self) -> u32 {
        self.n
    }

    fn rows_in_iteration(&self, i: u32) -> usize {
        self.prime_at(i) as usize
    }

    fn rows_for_symbol(&self, s: u32, i: u32) -> Vec<usize> {
        let p = self.prime_at(i);
        vec![(s as u64 % p) as usize]
    }

    fn decodability_guarantee(&self, k: u32) -> Decodability {
        if self.n <= 1 {
            return Decodability { max_delta: None };
        }
        let primes = self.cache.egh_primes(k as usize);
        let product: u128 = primes.iter().map(|&p| p as u128).product();
        let n = self.n as u128;

        let mut d = 0usize;
        let mut n_pow_d: u128 = 1;
        loop {
            let Some(next) = n_pow_d.checked_mul(n) else {
                break;
            };
            if next >= product {
                break;
            }
            n_pow_d = next;
            d += 1;
            if d > 128 {
                break;
            }
        }
        Decodability { max_delta: Some(d) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_primes_are_correct() {
        let cache = Arc::new(RowCache::new());
        let egh = Egh::new(100, cache);
        assert_eq!(egh.rows_in_iteration(1), 2);
        assert_eq!(egh.rows_in_iteration(2), 3);
        assert_eq!(egh.rows_in_iteration(3), 5);
        assert_eq!(egh.rows_in_iteration(4), 7);
    }

    #[test]
    fn free_zone_matches_spec_example() {
        // n=100: product of first 4 primes (2*3*5*7=210) > 100^1, and
        // 2*3*5=30 is not > 100, so the free zone for |Delta|=1 opens at k=4.
        let cache = Arc::new(RowCache::new());
        let egh = Egh::new(100, cache);
        assert!(egh.decodability_guarantee(3).max_delta.unwrap() < 1);
        assert!(egh.decodability_guarantee(4).max_delta.unwrap() >= 1);
    }
}
