//! Rateless set reconciliation over an integer universe.
//!
//! Two peers each hold a subset of the integers `1..=n`. Both grow an
//! Invertible Bloom Lookup Table (IBLT) over their own subset one iteration
//! at a time, using one of five combinatorial methods to decide which cells
//! a symbol maps to (EGH, Extended Hamming, OLS, BCH, IDM — see
//! [`mapping`]). Differencing two IBLTs cell-by-cell and peeling the result
//! recovers exactly the symbols each side has that the other doesn't,
//! without either side ever exchanging its raw symbol set.
//!
//! - [`cell`] — the three-accumulator cell algebra every method builds on.
//! - [`mapping`] — the five mapping generators and their shared contract.
//! - [`iblt`] — the growable sketch.
//! - [`differ`] — cell-wise differencing.
//! - [`peel`] — the peeling decoder.
//! - [`reconciler`] — the iteration-growing driver loop.
//! - [`transport`] — the session transport abstraction.
//! - [`wire`] — the on-wire batch/ack codec.
//! - [`config`] — session configuration shared by both peers.
//! - [`hash`] — the checksum hash used for cell purity checks.
//! - [`error`] — this crate's error type.

pub mod cell;
pub mod config;
pub mod differ;
pub mod error;
pub mod hash;
pub mod iblt;
pub mod mapping;
pub mod peel;
pub mod reconciler;
pub mod transport;
pub mod wire;

pub use cell::Cell;
pub use config::ReconcileConfig;
pub use error::{ReconcileError, ReconcileResult};
pub use hash::{HashContext, HashVariant};
pub use iblt::Iblt;
pub use mapping::{Method, MethodKind};
pub use peel::PeelResult;
pub use reconciler::{reconcile_in_memory, Reconciler};
