//! The canonical on-wire batch/ack codec (`spec.md` §6): fixed little-endian
//! layout, no framework-derived serialization. Mapping method, iteration
//! sizing, and whether checksums are present are session-level, agreed in
//! [`crate::config::ReconcileConfig`] — never re-derived from the bytes.

use crate::error::{ReconcileError, ReconcileResult};

/// One cell as it appears on the wire: counter, XOR-sum, and an optional
/// checksum (present unless the session runs under the superset assumption).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCell {
    pub counter: i64,
    pub xor_sum: u64,
    pub checksum: Option<u64>,
}

/// One iteration's worth of cells, as sent over a session transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireBatch {
    pub iteration: u32,
    pub cells: Vec<WireCell>,
}

/// The receiver's signal after attempting to decode against a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Decoding succeeded (or the iteration ceiling was reached): stop.
    Stop,
    /// Decoding is still incomplete: send the next iteration's batch.
    Continue,
}

const HEADER_LEN: usize = 9;
const CELL_LEN_NO_CHECKSUM: usize = 16;
const CELL_LEN_WITH_CHECKSUM: usize = 24;

impl WireBatch {
    pub fn encode(&self) -> Vec<u8> {
        let with_checksum = self.cells.iter().any(|c| c.checksum.is_some());
        let stride = if with_checksum {
            CELL_LEN_WITH_CHECKSUM
        } else {
            CELL_LEN_NO_CHECKSUM
        };
        let mut buf = Vec::with_capacity(HEADER_LEN + self.cells.len() * stride);
        buf.extend_from_slice(&self.iteration.to_le_bytes());
        buf.extend_from_slice(&(self.cells.len() as u32).to_le_bytes());
        buf.push(with_checksum as u8);
        for cell in &self.cells {
            buf.extend_from_slice(&cell.counter.to_le_bytes());
            buf.extend_from_slice(&cell.xor_sum.to_le_bytes());
            if with_checksum {
                buf.extend_from_slice(&cell.checksum.unwrap_or(0).to_le_bytes());
            }
        }
        buf
    }

    pub fn decode(bytes: &[u8]) -> ReconcileResult<Self> {
        let truncated = || ReconcileError::ProtocolViolation("truncated wire batch".to_string());
        if bytes.len() < HEADER_LEN {
            return Err(truncated());
        }
        let iteration = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let row_count = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        let with_checksum = bytes[8] != 0;
        let stride = if with_checksum {
            CELL_LEN_WITH_CHECKSUM
        } else {
            CELL_LEN_NO_CHECKSUM
        };

        let mut offset = HEADER_LEN;
        let mut cells = Vec::with_capacity(row_count);
        for _ in 0..row_count {
            if bytes.len() < offset + stride {
                return Err(truncated());
            }
            let counter = i64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
            let xor_sum = u64::from_le_bytes(bytes[offset + 8..offset + 16].try_into().unwrap());
            let checksum = if with_checksum {
                Some(u64::from_le_bytes(
                    bytes[offset + 16..offset + 24].try_into().unwrap(),
                ))
            } else {
                None
            };
            cells.push(WireCell {
                counter,
                xor_sum,
                checksum,
            });
            offset += stride;
        }
        Ok(WireBatch { iteration, cells })
    }
}

impl Ack {
    pub fn encode(self) -> u8 {
        match self {
            Ack::Stop => 0,
            Ack::Continue => 1,
        }
    }

    pub fn decode(byte: u8) -> ReconcileResult<Self> {
        match byte {
            0 => Ok(Ack::Stop),
            1 => Ok(Ack::Continue),
            other => Err(ReconcileError::ProtocolViolation(format!(
                "invalid ack byte {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_round_trips_with_checksums() {
        let batch = WireBatch {
            iteration: 3,
            cells: vec![
                WireCell {
                    counter: -1,
                    xor_sum: 42,
                    checksum: Some(9),
                },
                WireCell {
                    counter: 2,
                    xor_sum: 0,
                    checksum: Some(0),
                },
            ],
        };
        let bytes = batch.encode();
        assert_eq!(WireBatch::decode(&bytes).unwrap(), batch);
    }

    #[test]
    fn batch_round_trips_without_checksums() {
        let batch = WireBatch {
            iteration: 1,
            cells: vec![WireCell {
                counter: 1,
                xor_sum: 7,
                checksum: None,
            }],
        };
        let bytes = batch.encode();
        assert_eq!(WireBatch::decode(&bytes).unwrap(), batch);
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        let batch = WireBatch {
            iteration: 1,
            cells: vec![WireCell {
                counter: 1,
                xor_sum: 7,
                checksum: None,
            }],
        };
        let mut bytes = batch.encode();
        bytes.truncate(bytes.len() - 1);
        assert!(WireBatch::decode(&bytes).is_err());
    }

    #[test]
    fn ack_round_trips() {
        assert_eq!(Ack::decode(Ack::Stop.encode()).unwrap(), Ack::Stop);
        assert_eq!(Ack::decode(Ack::Continue.encode()).unwrap(), Ack::Continue);
        assert!(Ack::decode(7).is_err());
    }
}
