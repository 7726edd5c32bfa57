//! # Client Events
//!
//! State changes recorded by the client manager for the host to emit.

use serde::{Deserialize, Serialize};

use super::value_objects::{ClientId, ClientKind, Height};

/// Event produced by a successful client operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// A client was created.
    ClientCreated {
        /// New client.
        client_id: ClientId,
        /// Consensus algorithm it tracks.
        kind: ClientKind,
        /// Initial height.
        height: Height,
    },
    /// A header was accepted.
    ClientUpdated {
        /// Updated client.
        client_id: ClientId,
        /// Height recorded by the header.
        height: Height,
        /// Latest height after the update.
        latest_height: Height,
    },
    /// Misbehaviour froze the client.
    ClientFrozen {
        /// Frozen client.
        client_id: ClientId,
        /// Height at which conflicting claims were observed.
        height: Height,
    },
    /// Verified roots were evicted by the retention policy.
    RootsPruned {
        /// Affected client.
        client_id: ClientId,
        /// Evicted heights.
        heights: Vec<Height>,
    },
}

impl ClientEvent {
    /// Client this event concerns.
    pub fn client_id(&self) -> &ClientId {
        match self {
            ClientEvent::ClientCreated { client_id, .. }
            | ClientEvent::ClientUpdated { client_id, .. }
            | ClientEvent::ClientFrozen { client_id, .. }
            | ClientEvent::RootsPruned { client_id, .. } => client_id,
        }
    }
}
