//! # Inbound Ports
//!
//! What the client manager offers to the host's message router and to
//! protocol layers verifying commitment proofs.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ClientError, ClientId, ClientKind, ClientState, CommitmentRoot, ConsensusState, Header, Height,
};

/// Lifecycle state of a client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    /// Accepting headers.
    Active,
    /// Halted by misbehaviour. Terminal.
    Frozen,
}

/// Result of an accepted `update_client`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
    /// The latest height moved to `height`.
    Advanced {
        /// New latest height.
        height: Height,
    },
    /// A root below the latest height was recorded.
    Backfilled {
        /// Recorded height.
        height: Height,
    },
    /// The same root was already recorded at `height`. Nothing changed.
    AlreadyVerified {
        /// Existing height.
        height: Height,
    },
    /// An authentic header contradicts the root recorded at `height`.
    /// The client is now frozen.
    MisbehaviourDetected {
        /// Height of the conflict.
        height: Height,
    },
}

impl UpdateOutcome {
    /// Height the outcome refers to.
    pub fn height(&self) -> Height {
        match self {
            UpdateOutcome::Advanced { height }
            | UpdateOutcome::Backfilled { height }
            | UpdateOutcome::AlreadyVerified { height }
            | UpdateOutcome::MisbehaviourDetected { height } => *height,
        }
    }
}

/// Result of an accepted `submit_misbehaviour`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MisbehaviourOutcome {
    /// The client was active and is now frozen.
    Frozen,
    /// The client was already frozen; the evidence is valid but changes nothing.
    AlreadyFrozen,
}

/// Typed messages handed over by the host's router.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientMsg {
    /// Register a new client.
    CreateClient {
        /// New client identifier.
        client_id: ClientId,
        /// Declared kind.
        kind: ClientKind,
        /// Trusted starting point.
        consensus_state: ConsensusState,
    },
    /// Submit a header.
    UpdateClient {
        /// Target client.
        client_id: ClientId,
        /// Header to verify.
        header: Header,
    },
    /// Submit equivocation evidence.
    SubmitMisbehaviour {
        /// Target client.
        client_id: ClientId,
        /// First conflicting header.
        header_a: Header,
        /// Second conflicting header.
        header_b: Header,
    },
    /// Check a root against the recorded one.
    VerifyRoot {
        /// Target client.
        client_id: ClientId,
        /// Height to check.
        height: Height,
        /// Root the caller expects.
        expected_root: CommitmentRoot,
    },
}

impl ClientMsg {
    /// Client the message targets.
    pub fn client_id(&self) -> &ClientId {
        match self {
            ClientMsg::CreateClient { client_id, .. }
            | ClientMsg::UpdateClient { client_id, .. }
            | ClientMsg::SubmitMisbehaviour { client_id, .. }
            | ClientMsg::VerifyRoot { client_id, .. } => client_id,
        }
    }
}

/// Successful response to a [`ClientMsg`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientResponse {
    /// Client created at this height.
    Created {
        /// Initial height.
        height: Height,
    },
    /// Header accepted.
    Updated(UpdateOutcome),
    /// Evidence accepted.
    Misbehaviour(MisbehaviourOutcome),
    /// Root matched.
    RootVerified,
}

/// Client Manager API - inbound port.
///
/// Mutations take `&mut self`: the host applies one operation at a time.
pub trait ClientManagerApi {
    /// Register a client tracking `kind` from `consensus_state`.
    ///
    /// Returns the initial height.
    fn create_client(
        &mut self,
        client_id: ClientId,
        kind: ClientKind,
        consensus_state: ConsensusState,
    ) -> Result<Height, ClientError>;

    /// Verify `header` against the client's latest consensus state and
    /// record it.
    fn update_client(
        &mut self,
        client_id: &ClientId,
        header: Header,
    ) -> Result<UpdateOutcome, ClientError>;

    /// Freeze the client if the two headers equivocate.
    fn submit_misbehaviour(
        &mut self,
        client_id: &ClientId,
        header_a: &Header,
        header_b: &Header,
    ) -> Result<MisbehaviourOutcome, ClientError>;

    /// Check `expected_root` against the root recorded at `height`.
    fn verify_root(
        &self,
        client_id: &ClientId,
        height: Height,
        expected_root: &CommitmentRoot,
    ) -> Result<(), ClientError>;

    /// Full client record.
    fn client_state(&self, client_id: &ClientId) -> Result<ClientState, ClientError>;

    /// Consensus state recorded at `height`.
    fn consensus_state(
        &self,
        client_id: &ClientId,
        height: Height,
    ) -> Result<ConsensusState, ClientError>;

    /// Root recorded at `height`.
    fn root_at(&self, client_id: &ClientId, height: Height) -> Result<CommitmentRoot, ClientError>;

    /// Active or frozen.
    fn client_status(&self, client_id: &ClientId) -> Result<ClientStatus, ClientError>;

    /// All client identifiers, ascending.
    fn client_ids(&self) -> Result<Vec<ClientId>, ClientError>;
}
