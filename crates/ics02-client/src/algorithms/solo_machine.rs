//! # Solo Machine Predicate
//!
//! A header is authentic when the trusted operator key signed its
//! sign-bytes. The operator may rotate its key by carrying a new consensus
//! state in a header signed with the current key.

use super::predicate::ClientPredicate;
use crate::domain::{
    ClientKind, ConsensusState, Header, HeaderProof, KindState, ValidationError,
};

/// Validity/equivocation predicate for [`ClientKind::SoloMachine`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SoloMachinePredicate;

impl ClientPredicate for SoloMachinePredicate {
    fn kind(&self) -> ClientKind {
        ClientKind::SoloMachine
    }

    fn verify_proof(
        &self,
        trusted: &ConsensusState,
        header: &Header,
    ) -> Result<(), ValidationError> {
        let KindState::SoloMachine(sm) = trusted.kind_state() else {
            return Err(ValidationError::UnsupportedKind(trusted.kind()));
        };
        let HeaderProof::Signature(signature) = &header.proof else {
            return Err(ValidationError::InvalidProof(
                "expected an operator signature".to_string(),
            ));
        };
        sm.public_key.verify(&header.sign_bytes(), signature)
    }
}
