//! # Domain Value Objects
//!
//! Immutable value types shared by the light client: identifiers, heights,
//! commitment roots, client kinds and the ed25519 key material carried in
//! consensus states and header proofs.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};

use super::errors::{ClientError, ValidationError};
use super::invariants::invariant_valid_client_id;

/// Counterparty block height.
pub type Height = u64;

/// Host chain height, used only for retention bookkeeping.
pub type HostHeight = u64;

/// Identifier of a tracked counterparty chain.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Create a validated client identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ClientError> {
        let id = id.into();
        invariant_valid_client_id(&id)?;
        Ok(Self(id))
    }

    /// Borrow as `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClientId {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClientId {
    type Error = ClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

/// Opaque commitment root over which inclusion proofs are checked.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentRoot(Vec<u8>);

impl CommitmentRoot {
    /// Wrap raw digest bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the digest is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for CommitmentRoot {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for CommitmentRoot {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Display for CommitmentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for CommitmentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentRoot({})", self)
    }
}

/// Consensus algorithm a client tracks.
///
/// Selects the validity/equivocation predicate in the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClientKind {
    /// BFT chain finalized by a weighted validator quorum.
    Tendermint,
    /// Chain (or sequencer) run by a single trusted operator key.
    SoloMachine,
}

impl ClientKind {
    /// All built-in kinds.
    pub const ALL: [ClientKind; 2] = [ClientKind::Tendermint, ClientKind::SoloMachine];

    /// Client type string used in identifiers and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Tendermint => "07-tendermint",
            ClientKind::SoloMachine => "06-solomachine",
        }
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "07-tendermint" | "tendermint" => Ok(ClientKind::Tendermint),
            "06-solomachine" | "solomachine" => Ok(ClientKind::SoloMachine),
            other => Err(format!("unknown client kind: {other}")),
        }
    }
}

/// Whether a client accepts headers below its latest height.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeightPolicy {
    /// Every accepted header must be above the trusted height.
    #[default]
    StrictlyIncreasing,
    /// Headers below the latest height may fill gaps in the verified roots.
    AllowBackfill,
}

/// Root recorded for a verified height.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedRoot {
    /// Verified commitment root.
    pub root: CommitmentRoot,
    /// Host height at which it was recorded.
    pub recorded_at: HostHeight,
}

impl VerifiedRoot {
    /// Create a verified root entry.
    pub fn new(root: CommitmentRoot, recorded_at: HostHeight) -> Self {
        Self { root, recorded_at }
    }
}

/// Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Create from bytes, rejecting points that are not valid keys.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, ValidationError> {
        VerifyingKey::from_bytes(&bytes)
            .map_err(|_| ValidationError::InvalidProof("malformed public key".to_string()))?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), ValidationError> {
        let verifying_key = VerifyingKey::from_bytes(&self.0)
            .map_err(|_| ValidationError::InvalidProof("malformed public key".to_string()))?;

        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);

        verifying_key
            .verify(message, &sig)
            .map_err(|_| {
                ValidationError::InvalidProof(format!(
                    "signature verification failed for key {}",
                    self
                ))
            })
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

/// Ed25519 signature (64 bytes).
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(#[serde_as(as = "Bytes")] [u8; 64]);

impl Signature {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

/// Signing key held by a counterparty validator or operator.
///
/// Only needed by whoever produces headers (relayers, tests); the light
/// client itself never signs.
pub struct SignerKey {
    signing_key: SigningKey,
}

impl SignerKey {
    /// Create from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Public half of the key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign a message (deterministic).
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.signing_key.sign(message).to_bytes())
    }
}

/// Validator with voting power.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Validator {
    /// Consensus key.
    pub public_key: PublicKey,
    /// Voting power.
    pub power: u64,
}

/// Weighted validator set trusted at some height.
///
/// Persisted as its validator list; the total power is recomputed on decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Validator>", into = "Vec<Validator>")]
pub struct ValidatorSet {
    validators: Vec<Validator>,
    total_power: u64,
}

impl ValidatorSet {
    /// Create an empty validator set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validator, replacing the power of an existing key.
    pub fn add_validator(&mut self, public_key: PublicKey, power: u64) {
        match self
            .validators
            .iter_mut()
            .find(|v| v.public_key == public_key)
        {
            Some(existing) => existing.power = power,
            None => self.validators.push(Validator { public_key, power }),
        }
        self.total_power = self
            .validators
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(v.power));
    }

    /// Builder-style [`add_validator`](Self::add_validator).
    pub fn with_validator(mut self, public_key: PublicKey, power: u64) -> Self {
        self.add_validator(public_key, power);
        self
    }

    /// Voting power of `public_key`, if it is in the set.
    pub fn power_of(&self, public_key: &PublicKey) -> Option<u64> {
        self.validators
            .iter()
            .find(|v| &v.public_key == public_key)
            .map(|v| v.power)
    }

    /// Total voting power.
    pub fn total_power(&self) -> u64 {
        self.total_power
    }

    /// Whether `signed_power` is strictly more than 2/3 of the total.
    pub fn has_quorum(&self, signed_power: u64) -> bool {
        self.total_power > 0
            && (signed_power as u128) * 3 > (self.total_power as u128) * 2
    }

    /// Validator count.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Iterate over validators.
    pub fn iter(&self) -> impl Iterator<Item = &Validator> {
        self.validators.iter()
    }
}

impl From<Vec<Validator>> for ValidatorSet {
    fn from(validators: Vec<Validator>) -> Self {
        validators
            .into_iter()
            .fold(Self::new(), |set, v| set.with_validator(v.public_key, v.power))
    }
}

impl From<ValidatorSet> for Vec<Validator> {
    fn from(set: ValidatorSet) -> Self {
        set.validators
    }
}
