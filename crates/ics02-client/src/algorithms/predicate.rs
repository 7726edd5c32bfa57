//! # Client Predicate
//!
//! The capability set every client kind implements: proof authenticity,
//! header validity and equivocation detection.

use tracing::debug;

use super::equivocation::claims_conflict;
use crate::domain::{
    invariant_non_empty_root, ClientKind, ConsensusState, Header, HeightPolicy, ValidationError,
};

/// Validity and equivocation predicate for one client kind.
///
/// Implementations must be pure functions of their arguments so every node
/// applying the same headers reaches the same client state.
pub trait ClientPredicate: Send + Sync {
    /// Kind this predicate handles.
    fn kind(&self) -> ClientKind;

    /// Check only that `header.proof` authenticates against `trusted`.
    fn verify_proof(
        &self,
        trusted: &ConsensusState,
        header: &Header,
    ) -> Result<(), ValidationError>;

    /// Kind-specific checks on a proposed new consensus state.
    fn check_new_state(
        &self,
        _trusted: &ConsensusState,
        _new_state: &ConsensusState,
    ) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Verify `header` as a successor of `trusted` and return the
    /// consensus state to install.
    ///
    /// # Errors
    /// - `UnsupportedKind` if `trusted` is not of this predicate's kind
    /// - `StaleHeader` if the height policy rejects `header.height`
    /// - `InvalidProof` if the proof does not authenticate
    /// - `InconsistentState` if `header.new_state` disagrees with the header
    fn validate(
        &self,
        trusted: &ConsensusState,
        header: &Header,
    ) -> Result<ConsensusState, ValidationError> {
        if trusted.kind() != self.kind() {
            return Err(ValidationError::UnsupportedKind(trusted.kind()));
        }
        invariant_non_empty_root(&header.root)?;
        check_height_policy(trusted, header)?;
        self.verify_proof(trusted, header)?;

        let next = resolve_new_state(trusted, header)?;
        self.check_new_state(trusted, &next)?;

        debug!(
            "[ics02] {} header at height {} validated against height {}",
            self.kind(),
            header.height,
            trusted.height()
        );
        Ok(next)
    }

    /// Whether the two headers are misbehaviour against `trusted`.
    ///
    /// Both must be authentic and make conflicting claims. Symmetric in
    /// `a` and `b`.
    fn is_equivocation(&self, trusted: &ConsensusState, a: &Header, b: &Header) -> bool {
        if trusted.kind() != self.kind() || !claims_conflict(a, b) {
            return false;
        }
        self.verify_proof(trusted, a).is_ok() && self.verify_proof(trusted, b).is_ok()
    }
}

/// Apply the trusted state's height policy to `header`.
///
/// A header at exactly the trusted height is stale under every policy.
pub fn check_height_policy(
    trusted: &ConsensusState,
    header: &Header,
) -> Result<(), ValidationError> {
    let stale = match trusted.height_policy() {
        HeightPolicy::StrictlyIncreasing => header.height <= trusted.height(),
        HeightPolicy::AllowBackfill => header.height == trusted.height(),
    };
    if stale {
        return Err(ValidationError::StaleHeader {
            header_height: header.height,
            trusted_height: trusted.height(),
        });
    }
    Ok(())
}

/// The consensus state a valid header installs.
///
/// Either the header's own `new_state`, checked for agreement with the
/// header, or the trusted kind state carried to the header's height/root.
pub fn resolve_new_state(
    trusted: &ConsensusState,
    header: &Header,
) -> Result<ConsensusState, ValidationError> {
    let Some(new_state) = &header.new_state else {
        return Ok(trusted.successor(header.height, header.root.clone()));
    };

    if new_state.height() != header.height {
        return Err(ValidationError::InconsistentState(format!(
            "new state height {} differs from header height {}",
            new_state.height(),
            header.height
        )));
    }
    if new_state.root() != &header.root {
        return Err(ValidationError::InconsistentState(format!(
            "new state root {} differs from header root {}",
            new_state.root(),
            header.root
        )));
    }
    if new_state.kind() != trusted.kind() {
        return Err(ValidationError::InconsistentState(format!(
            "new state kind {} differs from client kind {}",
            new_state.kind(),
            trusted.kind()
        )));
    }
    Ok(new_state.clone())
}
