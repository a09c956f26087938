//! The session transport abstraction (`spec.md` §9's "abstraction, not class
//! inheritance" note, applied to the wire boundary too): the driver in
//! [`crate::reconciler`] is written only against these traits, so a
//! TCP, QUIC, or in-process implementation plugs in without touching the
//! protocol logic. `ConfigSender`/`ConfigReceiver` carry the one-time
//! session handshake; `CellSender`/`CellReceiver`/`AckSender`/`AckReceiver`
//! carry the per-iteration batch/ack exchange.

use std::sync::mpsc::{Receiver, Sender};

use crate::config::ReconcileConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::wire::{Ack, WireBatch};

pub trait CellSender {
    fn send_batch(&mut self, batch: WireBatch) -> ReconcileResult<()>;
}

pub trait CellReceiver {
    fn recv_batch(&mut self) -> ReconcileResult<WireBatch>;
}

pub trait AckSender {
    fn send_ack(&mut self, ack: Ack) -> ReconcileResult<()>;
}

pub trait AckReceiver {
    fn recv_ack(&mut self) -> ReconcileResult<Ack>;
}

/// The one-time config handshake (`spec.md` §6) that precedes the
/// per-iteration batch/ack exchange.
pub trait ConfigSender {
    fn send_config(&mut self, config: &ReconcileConfig) -> ReconcileResult<()>;
}

pub trait ConfigReceiver {
    fn recv_config(&mut self) -> ReconcileResult<ReconcileConfig>;
}

enum Message {
    Batch(WireBatch),
    Ack(Ack),
    Config(Vec<u8>),
}

/// An in-process channel endpoint implementing all six transport traits.
/// Used by tests and [`crate::reconciler`]'s doctests to exercise the full
/// protocol without a real socket.
pub struct LocalEndpoint {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl CellSender for LocalEndpoint {
    fn send_batch(&mut self, batch: WireBatch) -> ReconcileResult<()> {
        self.tx
            .send(Message::Batch(batch))
            .map_err(|_| ReconcileError::ProtocolViolation("peer disconnected".to_string()))
    }
}

impl CellReceiver for LocalEndpoint {
    fn recv_batch(&mut self) -> ReconcileResult<WireBatch> {
        match self.rx.recv() {
            Ok(Message::Batch(batch)) => Ok(batch),
            Ok(_) => Err(ReconcileError::ProtocolViolation(
                "expected a batch, peer sent something else".to_string(),
            )),
            Err(_) => Err(ReconcileError::ProtocolViolation(
                "peer disconnected".to_string(),
            )),
        }
    }
}

impl AckSender for LocalEndpoint {
    fn send_ack(&mut self, ack: Ack) -> ReconcileResult<()> {
        self.tx
            .send(Message::Ack(ack))
            .map_err(|_| ReconcileError::ProtocolViolation("peer disconnected".to_string()))
    }
}

impl AckReceiver for LocalEndpoint {
    fn recv_ack(&mut self) -> ReconcileResult<Ack> {
        match self.rx.recv() {
            Ok(Message::Ack(ack)) => Ok(ack),
            Ok(_) => Err(ReconcileError::ProtocolViolation(
                "expected an ack, peer sent something else".to_string(),
            )),
            Err(_) => Err(ReconcileError::ProtocolViolation(
                "peer disconnected".to_string(),
            )),
        }
    }
}

impl ConfigSender for LocalEndpoint {
    fn send_config(&mut self, config: &ReconcileConfig) -> ReconcileResult<()> {
        let bytes = config.to_bytes()?;
        self.tx
            .send(Message::Config(bytes))
            .map_err(|_| ReconcileError::ProtocolViolation("peer disconnected".to_string()))
    }
}

impl ConfigReceiver for LocalEndpoint {
    fn recv_config(&mut self) -> ReconcileResult<ReconcileConfig> {
        match self.rx.recv() {
            Ok(Message::Config(bytes)) => ReconcileConfig::from_bytes(&bytes),
            Ok(_) => Err(ReconcileError::ProtocolViolation(
                "expected a config, peer sent something else".to_string(),
            )),
            Err(_) => Err(ReconcileError::ProtocolViolation(
                "peer disconnected".to_string(),
            )),
        }
    }
}

/// A cross-wired pair of [`LocalEndpoint`]s: whatever one side sends, the
/// other receives.
pub fn local_pair() -> (LocalEndpoint, LocalEndpoint) {
    let (tx_a, rx_a) = std::sync::mpsc::channel();
    let (tx_b, rx_b) = std::sync::mpsc::channel();
    (
        LocalEndpoint { tx: tx_a, rx: rx_b },
        LocalEndpoint { tx: tx_b, rx: rx_a },
    )
}
