//! Persisted key layout.
//!
//! ```text
//! clientState/{clientId}                  -> ClientRecord
//! consensusState/{clientId}/{height:020}  -> ConsensusState
//! root/{clientId}/{height:020}            -> VerifiedRoot
//! ```
//!
//! Heights are zero-padded to 20 digits so byte order equals numeric order.
//! Client ids never contain `/`.

use crate::domain::{ClientId, Height};

/// Prefix of every client record key.
pub const CLIENT_STATE_PREFIX: &str = "clientState/";

/// Prefix of every consensus state key.
pub const CONSENSUS_STATE_PREFIX: &str = "consensusState/";

/// Prefix of every verified root key.
pub const ROOT_PREFIX: &str = "root/";

/// `clientState/{id}`
pub fn client_state(client_id: &ClientId) -> Vec<u8> {
    format!("{CLIENT_STATE_PREFIX}{client_id}").into_bytes()
}

/// `consensusState/{id}/{height}`
pub fn consensus_state(client_id: &ClientId, height: Height) -> Vec<u8> {
    format!("{CONSENSUS_STATE_PREFIX}{client_id}/{height:020}").into_bytes()
}

/// `consensusState/{id}/`
pub fn consensus_state_prefix(client_id: &ClientId) -> Vec<u8> {
    format!("{CONSENSUS_STATE_PREFIX}{client_id}/").into_bytes()
}

/// `root/{id}/{height}`
pub fn root(client_id: &ClientId, height: Height) -> Vec<u8> {
    format!("{ROOT_PREFIX}{client_id}/{height:020}").into_bytes()
}

/// `root/{id}/`
pub fn root_prefix(client_id: &ClientId) -> Vec<u8> {
    format!("{ROOT_PREFIX}{client_id}/").into_bytes()
}

/// Height encoded in the last segment of a consensus state or root key.
pub fn height_suffix(key: &[u8]) -> Option<Height> {
    let segment = key.rsplit(|b| *b == b'/').next()?;
    std::str::from_utf8(segment).ok()?.parse().ok()
}

/// Client id encoded in a `clientState/` key.
pub fn client_id_suffix(key: &[u8]) -> Option<ClientId> {
    let id = key.strip_prefix(CLIENT_STATE_PREFIX.as_bytes())?;
    ClientId::new(std::str::from_utf8(id).ok()?).ok()
}
