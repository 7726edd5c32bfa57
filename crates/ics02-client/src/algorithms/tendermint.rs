//! # Tendermint Predicate
//!
//! A header is authentic when validators holding strictly more than 2/3 of
//! the trusted voting power signed its sign-bytes.
//!
//! Each validator counts once. Signatures from keys outside the trusted set
//! carry no power and are skipped; a bad signature from a trusted key
//! rejects the whole proof.

use std::collections::BTreeSet;

use tracing::debug;

use super::predicate::ClientPredicate;
use crate::domain::{
    ClientKind, ConsensusState, Header, HeaderProof, KindState, ValidationError,
};

/// Validity/equivocation predicate for [`ClientKind::Tendermint`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TendermintPredicate;

impl ClientPredicate for TendermintPredicate {
    fn kind(&self) -> ClientKind {
        ClientKind::Tendermint
    }

    fn verify_proof(
        &self,
        trusted: &ConsensusState,
        header: &Header,
    ) -> Result<(), ValidationError> {
        let KindState::Tendermint(tm) = trusted.kind_state() else {
            return Err(ValidationError::UnsupportedKind(trusted.kind()));
        };
        let HeaderProof::Commit(signatures) = &header.proof else {
            return Err(ValidationError::InvalidProof(
                "expected a validator commit".to_string(),
            ));
        };

        let message = header.sign_bytes();
        let mut counted = BTreeSet::new();
        let mut signed_power = 0u64;

        for commit_sig in signatures {
            let Some(power) = tm.validators.power_of(&commit_sig.validator) else {
                debug!(
                    "[ics02] Skipping signature from unknown validator {}",
                    commit_sig.validator
                );
                continue;
            };
            if !counted.insert(commit_sig.validator) {
                continue;
            }
            commit_sig
                .validator
                .verify(&message, &commit_sig.signature)?;
            signed_power = signed_power.saturating_add(power);
        }

        if !tm.validators.has_quorum(signed_power) {
            return Err(ValidationError::InvalidProof(format!(
                "insufficient voting power: {} of {} signed",
                signed_power,
                tm.validators.total_power()
            )));
        }
        Ok(())
    }

    fn check_new_state(
        &self,
        _trusted: &ConsensusState,
        new_state: &ConsensusState,
    ) -> Result<(), ValidationError> {
        match new_state.kind_state() {
            KindState::Tendermint(tm) if tm.validators.total_power() == 0 => {
                Err(ValidationError::InconsistentState(
                    "next validator set has no voting power".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}
