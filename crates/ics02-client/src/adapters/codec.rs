//! Bincode encoding of persisted records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{ClientKind, CodecError, Height};

/// Stored under `clientState/{id}`.
///
/// Verified roots and consensus states live under their own keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Consensus algorithm tracked.
    pub kind: ClientKind,
    /// Whether misbehaviour froze the client.
    pub frozen: bool,
    /// Height of the latest consensus state.
    pub latest_height: Height,
}

/// Record codec using bincode.
#[derive(Clone, Copy, Debug, Default)]
pub struct BincodeRecordCodec;

impl BincodeRecordCodec {
    /// Encode a record.
    pub fn encode<T: Serialize>(&self, record: &T) -> Result<Vec<u8>, CodecError> {
        bincode::serialize(record).map_err(|e| CodecError {
            message: e.to_string(),
        })
    }

    /// Decode a record.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        bincode::deserialize(bytes).map_err(|e| CodecError {
            message: e.to_string(),
        })
    }
}
