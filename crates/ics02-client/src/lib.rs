//! # ICS-02 Counterparty Light Client
//!
//! Tracks a remote chain through proof-carrying headers instead of
//! replaying its consensus, records the commitment roots it has verified,
//! and freezes itself when it sees the remote validators equivocate.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Client Lifecycle
//!
//! | Operation | Transition | Fails with |
//! |-----------|------------|------------|
//! | `create_client` | ∅ → Active | `DuplicateClient`, `UnsupportedKind` |
//! | `update_client` | Active → Active | `ClientFrozen`, `StaleHeader`, `InvalidProof` |
//! | `submit_misbehaviour` | Active → Frozen | `NoMisbehaviour` |
//! | `verify_root` | Active, Frozen | `RootNotFound`, `RootMismatch` |
//!
//! Frozen is terminal. Roots recorded before the freeze stay queryable.
//!
//! ## Supported Kinds
//!
//! - `07-tendermint`: more than 2/3 of the trusted voting power signs
//! - `06-solomachine`: the trusted operator key signs
//!
//! ## Module Structure
//!
//! ```text
//! ics02-client/
//! ├── domain/          # ClientId, ConsensusState, ClientState, Header, errors, events
//! ├── algorithms/      # Per-kind predicates, registry, root retention
//! ├── ports/           # ClientManagerApi (inbound) + KeyValueStore, HostHeightSource (outbound)
//! ├── adapters/        # InMemoryKVStore, key layout, bincode records
//! ├── application/     # ClientManager
//! └── config.rs        # ClientConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{BincodeRecordCodec, ClientRecord, InMemoryKVStore};
pub use algorithms::{
    claims_conflict, ClientPredicate, PredicateRegistry, RegistryBuilder, SoloMachinePredicate,
    TendermintPredicate,
};
pub use application::ClientManager;
pub use config::{ClientConfig, RetentionPolicy};
pub use domain::{
    ClientError, ClientEvent, ClientId, ClientKind, ClientState, CommitSignature, CommitmentRoot,
    ConsensusState, ErrorCategory, Header, HeaderProof, Height, HeightPolicy, HostHeight,
    KindState, PublicKey, Signature, SignerKey, SoloMachineState, TendermintState,
    ValidationError, Validator, ValidatorSet, VerifiedRoot,
};
pub use ports::{
    BatchOperation, ClientManagerApi, ClientMsg, ClientResponse, ClientStatus, FixedHostHeight,
    HostHeightSource, KeyValueStore, MisbehaviourOutcome, UpdateOutcome,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
