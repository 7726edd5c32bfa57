//! # Predicate Registry
//!
//! Maps each [`ClientKind`] to its predicate. Built once, immutable after
//! [`RegistryBuilder::build`], so every node dispatches identically.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use lazy_static::lazy_static;

use super::predicate::ClientPredicate;
use super::solo_machine::SoloMachinePredicate;
use super::tendermint::TendermintPredicate;
use crate::domain::{ClientKind, ConsensusState, Header, ValidationError};

lazy_static! {
    /// Process-wide registry holding the built-in kinds.
    static ref GLOBAL_REGISTRY: Arc<PredicateRegistry> =
        Arc::new(PredicateRegistry::with_builtin_kinds());
}

/// Immutable kind → predicate table.
pub struct PredicateRegistry {
    predicates: BTreeMap<ClientKind, Box<dyn ClientPredicate>>,
}

impl PredicateRegistry {
    /// Start an empty registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            predicates: BTreeMap::new(),
        }
    }

    /// Registry with every built-in kind.
    pub fn with_builtin_kinds() -> Self {
        Self::builder()
            .register(TendermintPredicate)
            .register(SoloMachinePredicate)
            .build()
    }

    /// Shared process-wide registry, initialized on first use.
    pub fn global() -> Arc<PredicateRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// Predicate for `kind`.
    pub fn get(&self, kind: ClientKind) -> Result<&dyn ClientPredicate, ValidationError> {
        self.predicates
            .get(&kind)
            .map(|p| &**p)
            .ok_or(ValidationError::UnsupportedKind(kind))
    }

    /// Whether `kind` is registered.
    pub fn supports(&self, kind: ClientKind) -> bool {
        self.predicates.contains_key(&kind)
    }

    /// Registered kinds in ascending order.
    pub fn kinds(&self) -> impl Iterator<Item = ClientKind> + '_ {
        self.predicates.keys().copied()
    }

    /// Validity predicate dispatched on `trusted.kind()`.
    pub fn validate(
        &self,
        trusted: &ConsensusState,
        header: &Header,
    ) -> Result<ConsensusState, ValidationError> {
        self.get(trusted.kind())?.validate(trusted, header)
    }

    /// Proof authenticity dispatched on `trusted.kind()`.
    pub fn verify_proof(
        &self,
        trusted: &ConsensusState,
        header: &Header,
    ) -> Result<(), ValidationError> {
        self.get(trusted.kind())?.verify_proof(trusted, header)
    }

    /// Equivocation predicate dispatched on `trusted.kind()`.
    ///
    /// An unregistered kind is never equivocation.
    pub fn is_equivocation(&self, trusted: &ConsensusState, a: &Header, b: &Header) -> bool {
        self.get(trusted.kind())
            .map(|p| p.is_equivocation(trusted, a, b))
            .unwrap_or(false)
    }
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("kinds", &self.predicates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`PredicateRegistry`].
pub struct RegistryBuilder {
    predicates: BTreeMap<ClientKind, Box<dyn ClientPredicate>>,
}

impl RegistryBuilder {
    /// Register `predicate` under its own kind, replacing any earlier one.
    pub fn register<P: ClientPredicate + 'static>(mut self, predicate: P) -> Self {
        self.predicates.insert(predicate.kind(), Box::new(predicate));
        self
    }

    /// Freeze the table.
    pub fn build(self) -> PredicateRegistry {
        PredicateRegistry {
            predicates: self.predicates,
        }
    }
}
