//! The mapping generator: lazily extends an infinite sparse 0/1 matrix that
//! assigns symbols to cells (`spec.md` §4.2).

pub mod bch;
pub mod cache;
pub mod egh;
pub mod gf2;
pub mod hamming;
pub mod idm;
pub mod ols;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use cache::RowCache;

/// Which combinatorial method supplies the mapping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Egh,
    ExtendedHamming,
    Ols,
    Bch,
    Idm,
}

/// What `rows_in_iteration`/`generate` describe: the shape of the batch of
/// rows a given iteration appends to the logical mapping matrix. The rows
/// themselves are never materialized densely — callers reach them through
/// [`MappingGenerator::rows_for_symbol`] / [`MappingGenerator::column_support`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBatch {
    pub iteration: u32,
    pub row_count: usize,
}

/// The decoding guarantee a method claims at a given iteration depth.
/// `max_delta` is the largest `|Δ|` decoding is known to succeed for —
/// with probability 1 for EGH/ExtendedHamming, with high probability for
/// the rest — or `None` if the method gives no closed-form bound at this k.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decodability {
    pub max_delta: Option<usize>,
}

/// The contract every mapping rule implements. `spec.md` §4.2's five
/// methods share this contract; the reconciliation protocol and peeling
/// decoder are written entirely against it.
pub trait MappingGenerator {
    /// The shared universe size `n`: valid symbols are `1..=n`. `spec.md`
    /// §4.5 step 2 rejects any pure cell whose revealed symbol falls outside
    /// this range rather than trusting it as a genuine recovered symbol.
    fn n(&self) -> u32;

    /// Number of rows iteration `i` (1-based) appends.
    fn rows_in_iteration(&self, i: u32) -> usize;

    /// Local row indices within iteration `i`'s batch that symbol `s` hits.
    fn rows_for_symbol(&self, s: u32, i: u32) -> Vec<usize>;

    /// The claimed decoding guarantee after iterations `1..=k`.
    fn decodability_guarantee(&self, k: u32) -> Decodability;

    /// Total rows appended by iterations `1..=k`.
    fn rows_through(&self, k: u32) -> usize {
        (1..=k).map(|i| self.rows_in_iteration(i)).sum()
    }

    /// `generate(i)`: the shape of iteration `i`'s batch (`spec.md`'s
    /// `RowBatch`). The row *contents* come from `rows_for_symbol`.
    fn generate(&self, i: u32) -> RowBatch {
        RowBatch {
            iteration: i,
            row_count: self.rows_in_iteration(i),
        }
    }

    /// Every global row index in `[0, rows_through(k))` where symbol `s` is
    /// mapped to 1 — computed iteration by iteration without materializing
    /// any row unrelated to `s`.
    fn column_support(&self, s: u32, k: u32) -> Vec<usize> {
        let mut out = Vec::new();
        let mut offset = 0usize;
        for i in 1..=k {
            for local in self.rows_for_symbol(s, i) {
                out.push(offset + local);
            }
            offset += self.rows_in_iteration(i);
        }
        out
    }
}

/// Tagged union over the five methods, each carrying its own derived state
/// (prime list length, GF(2^m) degree, Latin-square size, IDM's `k`).
/// `spec.md` §9 asks for exactly this: "a tagged variant ... expose the
/// MappingGenerator contract via an abstraction, not class inheritance."
pub enum Method {
    Egh(egh::Egh),
    ExtendedHamming(hamming::ExtendedHamming),
    Ols(ols::Ols),
    Bch(bch::Bch),
    Idm(idm::Idm),
}

impl Method {
    pub fn new(kind: MethodKind, n: u32, cache: Arc<RowCache>) -> Self {
        match kind {
            MethodKind::Egh => Method::Egh(egh::Egh::new(n, cache)),
            MethodKind::ExtendedHamming => {
                Method::ExtendedHamming(hamming::ExtendedHamming::new(n))
            }
            MethodKind::Ols => Method::Ols(ols::Ols::new(n)),
            MethodKind::Bch => Method::Bch(bch::Bch::new(n, cache)),
            MethodKind::Idm => Method::Idm(idm::Idm::new(n, cache)),
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            Method::Egh(_) => MethodKind::Egh,
            Method::ExtendedHamming(_) => MethodKind::ExtendedHamming,
            Method::Ols(_) => MethodKind::Ols,
            Method::Bch(_) => MethodKind::Bch,
            Method::Idm(_) => MethodKind::Idm,
        }
    }
}

impl MappingGenerator for Method {
    fn n(&self) -> u32 {
        match self {
            Method::Egh(m) => m.n(),
            Method::ExtendedHamming(m) => m.n(),
            Method::Ols(m) => m.n(),
            Method::Bch(m) => m.n(),
            Method::Idm(m) => m.n(),
        }
    }

    fn rows_in_iteration(&self, i: u32) -> usize {
        match self {
            Method::Egh(m) => m.rows_in_iteration(i),
            Method::ExtendedHamming(m) => m.rows_in_iteration(i),
            Method::Ols(m) => m.rows_in_iteration(i),
            Method::Bch(m) => m.rows_in_iteration(i),
            Method::Idm(m) => m.rows_in_iteration(i),
        }
    }

    fn rows_for_symbol(&self, s: u32, i: u32) -> Vec<usize> {
        match self {
            Method::Egh(m) => m.rows_for_symbol(s, i),
            Method::ExtendedHamming(m) => m.rows_for_symbol(s, i),
            Method::Ols(m) => m.rows_for_symbol(s, i),
            Method::Bch(m) => m.rows_for_symbol(s, i),
            Method::Idm(m) => m.rows_for_symbol(s, i),
        }
    }

    fn decodability_guarantee(&self, k: u32) -> Decodability {
        match self {
            Method::Egh(m) => m.decodability_guarantee(k),
            Method::ExtendedHamming(m) => m.decodability_guarantee(k),
            Method::Ols(m) => m.decodability_guarantee(k),
            Method::Bch(m) => m.decodability_guarantee(k),
            Method::Idm(m) => m.decodability_guarantee(k),
        }
    }
}
