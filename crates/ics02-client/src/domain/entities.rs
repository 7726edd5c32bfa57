//! # Domain Entities
//!
//! Consensus states, client records and headers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::errors::ClientError;
use super::value_objects::{
    ClientId, ClientKind, CommitmentRoot, Height, HeightPolicy, HostHeight, PublicKey, Signature,
    SignerKey, ValidatorSet, VerifiedRoot,
};

/// Domain tag mixed into every header sign-bytes digest.
pub const HEADER_SIGN_DOMAIN: &[u8] = b"ics02/header/v1";

/// Trusted state of a Tendermint-style chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TendermintState {
    /// Validator set that must sign the next header.
    pub validators: ValidatorSet,
    /// Height ordering accepted by this client.
    pub height_policy: HeightPolicy,
}

/// Trusted state of a single-operator chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoloMachineState {
    /// Operator key that must sign the next header.
    pub public_key: PublicKey,
}

/// Kind-specific part of a consensus state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KindState {
    /// Weighted validator quorum.
    Tendermint(TendermintState),
    /// Single operator key.
    SoloMachine(SoloMachineState),
}

impl KindState {
    /// Tag of this variant.
    pub fn kind(&self) -> ClientKind {
        match self {
            KindState::Tendermint(_) => ClientKind::Tendermint,
            KindState::SoloMachine(_) => ClientKind::SoloMachine,
        }
    }

    /// Height ordering accepted by this state.
    pub fn height_policy(&self) -> HeightPolicy {
        match self {
            KindState::Tendermint(tm) => tm.height_policy,
            KindState::SoloMachine(_) => HeightPolicy::StrictlyIncreasing,
        }
    }

    fn hash_into(&self, hasher: &mut Sha256) {
        match self {
            KindState::Tendermint(tm) => {
                hasher.update([0u8]);
                hasher.update([match tm.height_policy {
                    HeightPolicy::StrictlyIncreasing => 0u8,
                    HeightPolicy::AllowBackfill => 1u8,
                }]);
                hasher.update((tm.validators.len() as u64).to_be_bytes());
                for validator in tm.validators.iter() {
                    hasher.update(validator.public_key.as_bytes());
                    hasher.update(validator.power.to_be_bytes());
                }
            }
            KindState::SoloMachine(sm) => {
                hasher.update([1u8]);
                hasher.update(sm.public_key.as_bytes());
            }
        }
    }
}

/// Snapshot of the counterparty chain at one height.
///
/// Immutable: advancing a client produces a new value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsensusState {
    height: Height,
    root: CommitmentRoot,
    kind_state: KindState,
}

impl ConsensusState {
    /// Create a consensus state.
    pub fn new(height: Height, root: CommitmentRoot, kind_state: KindState) -> Self {
        Self {
            height,
            root,
            kind_state,
        }
    }

    /// Tendermint consensus state with the default height policy.
    pub fn tendermint(height: Height, root: CommitmentRoot, validators: ValidatorSet) -> Self {
        Self::new(
            height,
            root,
            KindState::Tendermint(TendermintState {
                validators,
                height_policy: HeightPolicy::default(),
            }),
        )
    }

    /// Single-operator consensus state.
    pub fn solo_machine(height: Height, root: CommitmentRoot, public_key: PublicKey) -> Self {
        Self::new(
            height,
            root,
            KindState::SoloMachine(SoloMachineState { public_key }),
        )
    }

    /// Height this state was observed at.
    pub fn height(&self) -> Height {
        self.height
    }

    /// Commitment root at this height.
    pub fn root(&self) -> &CommitmentRoot {
        &self.root
    }

    /// Consensus algorithm that produced this state.
    pub fn kind(&self) -> ClientKind {
        self.kind_state.kind()
    }

    /// Kind-specific trusted data.
    pub fn kind_state(&self) -> &KindState {
        &self.kind_state
    }

    /// Height ordering accepted on top of this state.
    pub fn height_policy(&self) -> HeightPolicy {
        self.kind_state.height_policy()
    }

    /// Same kind state at a new height and root.
    pub fn successor(&self, height: Height, root: CommitmentRoot) -> Self {
        Self::new(height, root, self.kind_state.clone())
    }

    /// Canonical SHA-256 digest.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        self.hash_into(&mut hasher);
        finalize(hasher)
    }

    fn hash_into(&self, hasher: &mut Sha256) {
        hasher.update(self.height.to_be_bytes());
        hash_root(hasher, &self.root);
        self.kind_state.hash_into(hasher);
    }
}

fn finalize(hasher: Sha256) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

fn hash_root(hasher: &mut Sha256, root: &CommitmentRoot) {
    hasher.update((root.as_bytes().len() as u64).to_be_bytes());
    hasher.update(root.as_bytes());
}

/// Per-counterparty client record.
///
/// Only the client manager mutates it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientState {
    client_id: ClientId,
    latest_consensus_state: ConsensusState,
    verified_roots: BTreeMap<Height, VerifiedRoot>,
    frozen: bool,
}

impl ClientState {
    /// Create an active client from its initial consensus state.
    ///
    /// Duplicate detection happens in the manager before this is called.
    pub fn create(
        client_id: ClientId,
        initial_consensus_state: ConsensusState,
        recorded_at: HostHeight,
    ) -> Self {
        let mut verified_roots = BTreeMap::new();
        verified_roots.insert(
            initial_consensus_state.height(),
            VerifiedRoot::new(initial_consensus_state.root().clone(), recorded_at),
        );
        Self {
            client_id,
            latest_consensus_state: initial_consensus_state,
            verified_roots,
            frozen: false,
        }
    }

    /// Rebuild a record loaded from storage.
    pub(crate) fn from_parts(
        client_id: ClientId,
        latest_consensus_state: ConsensusState,
        verified_roots: BTreeMap<Height, VerifiedRoot>,
        frozen: bool,
    ) -> Self {
        Self {
            client_id,
            latest_consensus_state,
            verified_roots,
            frozen,
        }
    }

    /// Client identifier.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Consensus algorithm this client tracks.
    pub fn kind(&self) -> ClientKind {
        self.latest_consensus_state.kind()
    }

    /// Whether misbehaviour has frozen this client.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Height of the latest accepted consensus state.
    pub fn latest_height(&self) -> Height {
        self.latest_consensus_state.height()
    }

    /// Latest accepted consensus state.
    pub fn latest_consensus_state(&self) -> &ConsensusState {
        &self.latest_consensus_state
    }

    /// Root verified at `height`. Does not fall back to the latest state.
    pub fn root_at(&self, height: Height) -> Result<&CommitmentRoot, ClientError> {
        self.verified_roots
            .get(&height)
            .map(|entry| &entry.root)
            .ok_or_else(|| ClientError::RootNotFound {
                client_id: self.client_id.clone(),
                height,
            })
    }

    /// Verified root entry at `height`.
    pub fn verified_root(&self, height: Height) -> Option<&VerifiedRoot> {
        self.verified_roots.get(&height)
    }

    /// Verified heights in ascending order.
    pub fn verified_heights(&self) -> impl Iterator<Item = Height> + '_ {
        self.verified_roots.keys().copied()
    }

    /// Number of retained roots.
    pub fn verified_root_count(&self) -> usize {
        self.verified_roots.len()
    }

    pub(crate) fn verified_roots(&self) -> &BTreeMap<Height, VerifiedRoot> {
        &self.verified_roots
    }

    /// SHA-256 over the full record.
    ///
    /// Equal digests before and after an operation mean the record was
    /// left untouched.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.client_id.as_str().len() as u64).to_be_bytes());
        hasher.update(self.client_id.as_str().as_bytes());
        hasher.update([self.frozen as u8]);
        self.latest_consensus_state.hash_into(&mut hasher);
        hasher.update((self.verified_roots.len() as u64).to_be_bytes());
        for (height, entry) in &self.verified_roots {
            hasher.update(height.to_be_bytes());
            hash_root(&mut hasher, &entry.root);
            hasher.update(entry.recorded_at.to_be_bytes());
        }
        finalize(hasher)
    }

    /// Install a new latest consensus state and record its root.
    pub(crate) fn advance(&mut self, new_state: ConsensusState, recorded_at: HostHeight) {
        self.verified_roots.insert(
            new_state.height(),
            VerifiedRoot::new(new_state.root().clone(), recorded_at),
        );
        self.latest_consensus_state = new_state;
    }

    /// Record a root below the latest height without moving the latest state.
    pub(crate) fn record_backfill(
        &mut self,
        height: Height,
        root: CommitmentRoot,
        recorded_at: HostHeight,
    ) {
        self.verified_roots
            .entry(height)
            .or_insert_with(|| VerifiedRoot::new(root, recorded_at));
    }

    /// Freeze the client. Returns `false` if it was already frozen.
    pub(crate) fn freeze(&mut self) -> bool {
        let changed = !self.frozen;
        self.frozen = true;
        changed
    }

    /// Drop roots at `heights`, never the latest one. Returns the heights
    /// actually removed.
    pub(crate) fn remove_roots(&mut self, heights: &[Height]) -> Vec<Height> {
        let latest = self.latest_height();
        heights
            .iter()
            .copied()
            .filter(|h| *h != latest && self.verified_roots.remove(h).is_some())
            .collect()
    }
}

/// Signature by one validator over a header's sign-bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitSignature {
    /// Signing validator.
    pub validator: PublicKey,
    /// Signature over [`Header::sign_bytes`].
    pub signature: Signature,
}

/// Kind-specific proof that a header is authentic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderProof {
    /// Validator signatures (Tendermint).
    Commit(Vec<CommitSignature>),
    /// Operator signature (SoloMachine).
    Signature(Signature),
}

/// Proof-carrying claim about a new counterparty height.
///
/// Supplied by callers, never persisted as-is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    /// Height being proven.
    pub height: Height,
    /// Proof over [`Header::sign_bytes`].
    pub proof: HeaderProof,
    /// Consensus state to install on success, if the header carries one.
    pub new_state: Option<ConsensusState>,
    /// Root claimed valid at `height`.
    pub root: CommitmentRoot,
}

impl Header {
    /// Create a header.
    pub fn new(
        height: Height,
        root: CommitmentRoot,
        new_state: Option<ConsensusState>,
        proof: HeaderProof,
    ) -> Self {
        Self {
            height,
            proof,
            new_state,
            root,
        }
    }

    /// Digest every proof signs: height, root and the proposed new state.
    pub fn sign_bytes(&self) -> [u8; 32] {
        Self::compute_sign_bytes(self.height, &self.root, self.new_state.as_ref())
    }

    fn compute_sign_bytes(
        height: Height,
        root: &CommitmentRoot,
        new_state: Option<&ConsensusState>,
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(HEADER_SIGN_DOMAIN);
        hasher.update(height.to_be_bytes());
        hash_root(&mut hasher, root);
        match new_state {
            Some(state) => {
                hasher.update([1u8]);
                hasher.update(state.digest());
            }
            None => hasher.update([0u8]),
        }
        finalize(hasher)
    }

    /// Build a header signed by each of `signers` (Tendermint).
    pub fn signed_by_validators(
        height: Height,
        root: CommitmentRoot,
        new_state: Option<ConsensusState>,
        signers: &[&SignerKey],
    ) -> Self {
        let message = Self::compute_sign_bytes(height, &root, new_state.as_ref());
        let signatures = signers
            .iter()
            .map(|signer| CommitSignature {
                validator: signer.public_key(),
                signature: signer.sign(&message),
            })
            .collect();
        Self::new(height, root, new_state, HeaderProof::Commit(signatures))
    }

    /// Build a header signed by a single operator (SoloMachine).
    pub fn signed_by_operator(
        height: Height,
        root: CommitmentRoot,
        new_state: Option<ConsensusState>,
        operator: &SignerKey,
    ) -> Self {
        let message = Self::compute_sign_bytes(height, &root, new_state.as_ref());
        let signature = operator.sign(&message);
        Self::new(height, root, new_state, HeaderProof::Signature(signature))
    }

    /// Whether two headers make the same claim (ignoring proofs).
    pub fn same_claim(&self, other: &Header) -> bool {
        self.height == other.height && self.root == other.root && self.new_state == other.new_state
    }
}
