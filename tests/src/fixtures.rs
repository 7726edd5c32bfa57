//! Shared fixtures: simulated counterparty chains that sign headers, and
//! manager construction.

use std::sync::Once;

use ics02_client::{
    ClientConfig, ClientId, ClientManager, CommitmentRoot, ConsensusState, FixedHostHeight, Header,
    HeightPolicy, InMemoryKVStore, KindState, PublicKey, SignerKey, TendermintState, ValidatorSet,
};
use tracing_subscriber::EnvFilter;

/// Manager over the in-memory store and a settable host height.
pub type TestManager = ClientManager<InMemoryKVStore, FixedHostHeight>;

/// Host height new managers start at.
pub const GENESIS_HOST_HEIGHT: u64 = 1_000;

static TRACING: Once = Once::new();

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Manager that keeps every root.
pub fn new_manager() -> TestManager {
    manager_with(ClientConfig::for_testing())
}

/// Manager with an explicit configuration.
pub fn manager_with(config: ClientConfig) -> TestManager {
    init_tracing();
    ClientManager::new(
        config,
        InMemoryKVStore::new(),
        FixedHostHeight(GENESIS_HOST_HEIGHT),
    )
}

/// 32-byte root filled with `byte`.
pub fn root(byte: u8) -> CommitmentRoot {
    CommitmentRoot::new(vec![byte; 32])
}

/// Client id from a literal known to be valid.
pub fn client_id(id: &str) -> ClientId {
    ClientId::new(id).unwrap_or_else(|e| panic!("fixture client id {id:?}: {e}"))
}

/// Simulated Tendermint chain with equally weighted validators.
pub struct TendermintChain {
    validators: Vec<SignerKey>,
    height_policy: HeightPolicy,
}

impl TendermintChain {
    /// Power held by every simulated validator.
    pub const POWER: u64 = 10;

    /// Chain with `count` validators. `seed_base` keeps different chains'
    /// keys apart.
    pub fn new(seed_base: u8, count: u8) -> Self {
        let validators = (0..count)
            .map(|i| SignerKey::from_seed([seed_base.wrapping_add(i); 32]))
            .collect();
        Self {
            validators,
            height_policy: HeightPolicy::StrictlyIncreasing,
        }
    }

    /// Accept headers below the latest height.
    pub fn with_backfill(mut self) -> Self {
        self.height_policy = HeightPolicy::AllowBackfill;
        self
    }

    /// Number of validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the chain has no validators.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Trusted validator set.
    pub fn validator_set(&self) -> ValidatorSet {
        self.validators.iter().fold(ValidatorSet::new(), |set, k| {
            set.with_validator(k.public_key(), Self::POWER)
        })
    }

    /// Consensus state trusting this chain's validators.
    pub fn consensus_state(&self, height: u64, root: CommitmentRoot) -> ConsensusState {
        ConsensusState::new(
            height,
            root,
            KindState::Tendermint(TendermintState {
                validators: self.validator_set(),
                height_policy: self.height_policy,
            }),
        )
    }

    /// Header signed by every validator.
    pub fn header(&self, height: u64, root: CommitmentRoot) -> Header {
        self.header_signed_by(height, root, self.validators.len())
    }

    /// Header signed by the first `count` validators.
    pub fn header_signed_by(&self, height: u64, root: CommitmentRoot, count: usize) -> Header {
        let signers: Vec<&SignerKey> = self.validators.iter().take(count).collect();
        Header::signed_by_validators(height, root, None, &signers)
    }

    /// Header signed by the validators selected in `mask` (bit i = validator i).
    pub fn header_signed_by_mask(&self, height: u64, root: CommitmentRoot, mask: u32) -> Header {
        let signers: Vec<&SignerKey> = self
            .validators
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, k)| k)
            .collect();
        Header::signed_by_validators(height, root, None, &signers)
    }

    /// Header handing trust over to `next`, signed by this chain.
    pub fn handover(&self, next: &TendermintChain, height: u64, root: CommitmentRoot) -> Header {
        let new_state = next.consensus_state(height, root.clone());
        let signers: Vec<&SignerKey> = self.validators.iter().collect();
        Header::signed_by_validators(height, root, Some(new_state), &signers)
    }
}

/// Simulated single-operator chain.
pub struct SoloMachine {
    operator: SignerKey,
}

impl SoloMachine {
    /// Operator derived from `seed`.
    pub fn new(seed: u8) -> Self {
        Self {
            operator: SignerKey::from_seed([seed; 32]),
        }
    }

    /// Operator public key.
    pub fn public_key(&self) -> PublicKey {
        self.operator.public_key()
    }

    /// Consensus state trusting this operator.
    pub fn consensus_state(&self, height: u64, root: CommitmentRoot) -> ConsensusState {
        ConsensusState::solo_machine(height, root, self.public_key())
    }

    /// Header signed by the operator.
    pub fn header(&self, height: u64, root: CommitmentRoot) -> Header {
        Header::signed_by_operator(height, root, None, &self.operator)
    }

    /// Header rotating trust to `next`'s key, signed by this operator.
    pub fn rotate_to(&self, next: &SoloMachine, height: u64, root: CommitmentRoot) -> Header {
        let new_state = next.consensus_state(height, root.clone());
        Header::signed_by_operator(height, root, Some(new_state), &self.operator)
    }
}
