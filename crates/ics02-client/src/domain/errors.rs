//! # Domain Errors
//!
//! Error types for the counterparty light client.
//!
//! Two layers: [`ValidationError`] is what a kind's predicate returns,
//! [`ClientError`] is what the client manager surfaces to its caller.

use thiserror::Error;

use super::value_objects::{ClientId, ClientKind, CommitmentRoot, Height};

/// Header validation errors returned by the validity predicate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The header proof does not authenticate against the trusted state.
    #[error("Invalid header proof: {0}")]
    InvalidProof(String),

    /// Header height does not advance the trusted height.
    #[error("Stale header: height {header_height} <= trusted height {trusted_height}")]
    StaleHeader {
        /// Height claimed by the header.
        header_height: Height,
        /// Height of the consensus state it was checked against.
        trusted_height: Height,
    },

    /// No predicate is registered for this client kind.
    #[error("Unsupported client kind: {0}")]
    UnsupportedKind(ClientKind),

    /// The header's new consensus state disagrees with the header itself.
    #[error("Inconsistent consensus state: {0}")]
    InconsistentState(String),
}

/// Key-value store errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Backend message.
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Backend message.
        message: String,
    },
}

/// Record encoding errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Record codec error: {message}")]
pub struct CodecError {
    /// Encoder/decoder message.
    pub message: String,
}

/// Coarse classification of [`ClientError`] used by the dispatch layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller mistake, no state change.
    Configuration,
    /// Expected and recoverable by resubmitting better input.
    Validation,
    /// Terminal for the client in question.
    Lifecycle,
    /// Legitimate negative result of a misbehaviour check.
    NoMisbehaviour,
    /// Storage or encoding failure in the host.
    Infrastructure,
}

/// Client manager errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// A client with this identifier already exists.
    #[error("Client already exists: {0}")]
    DuplicateClient(ClientId),

    /// The client kind is not registered or not allowed.
    #[error("Unsupported client kind: {0}")]
    UnsupportedKind(ClientKind),

    /// Malformed client identifier.
    #[error("Invalid client id {id:?}: {reason}")]
    InvalidClientId {
        /// Rejected identifier.
        id: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Header validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No root is recorded at this height (never verified or pruned).
    #[error("No verified root for client {client_id} at height {height}")]
    RootNotFound {
        /// Client queried.
        client_id: ClientId,
        /// Height queried.
        height: Height,
    },

    /// The recorded root differs from the expected one.
    #[error("Root mismatch for client {client_id} at height {height}: expected {expected}, recorded {recorded}")]
    RootMismatch {
        /// Client queried.
        client_id: ClientId,
        /// Height queried.
        height: Height,
        /// Root supplied by the caller.
        expected: CommitmentRoot,
        /// Root recorded by the client.
        recorded: CommitmentRoot,
    },

    /// The client is frozen and accepts no further headers.
    #[error("Client is frozen: {0}")]
    ClientFrozen(ClientId),

    /// No client with this identifier.
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// Submitted evidence is not misbehaviour.
    #[error("No misbehaviour found for client {0}")]
    NoMisbehaviour(ClientId),

    /// Underlying store failed.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// Persisted record could not be encoded/decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ClientError {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::DuplicateClient(_)
            | ClientError::UnsupportedKind(_)
            | ClientError::InvalidClientId { .. } => ErrorCategory::Configuration,
            ClientError::Validation(ValidationError::UnsupportedKind(_)) => {
                ErrorCategory::Configuration
            }
            ClientError::Validation(_)
            | ClientError::RootNotFound { .. }
            | ClientError::RootMismatch { .. } => ErrorCategory::Validation,
            ClientError::ClientFrozen(_) | ClientError::ClientNotFound(_) => {
                ErrorCategory::Lifecycle
            }
            ClientError::NoMisbehaviour(_) => ErrorCategory::NoMisbehaviour,
            ClientError::Storage(_) | ClientError::Codec(_) => ErrorCategory::Infrastructure,
        }
    }
}
