//! # Algorithms Module
//!
//! Validity and equivocation predicates per client kind, the registry that
//! dispatches to them, and root retention.

pub mod equivocation;
pub mod predicate;
pub mod registry;
pub mod retention;
pub mod solo_machine;
pub mod tendermint;

pub use equivocation::claims_conflict;
pub use predicate::{check_height_policy, resolve_new_state, ClientPredicate};
pub use registry::{PredicateRegistry, RegistryBuilder};
pub use retention::select_evictions;
pub use solo_machine::SoloMachinePredicate;
pub use tendermint::TendermintPredicate;
