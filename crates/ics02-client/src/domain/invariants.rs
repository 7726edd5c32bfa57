//! # Domain Invariants
//!
//! Rules that must hold for every client record, checked at the points
//! where records are built or changed.

use std::collections::BTreeMap;

use super::errors::{ClientError, ValidationError};
use super::value_objects::{CommitmentRoot, Height, VerifiedRoot};

/// Maximum client identifier length.
pub const MAX_CLIENT_ID_LEN: usize = 64;

/// Non-alphanumeric characters allowed in client identifiers.
pub const CLIENT_ID_EXTRA_CHARS: &[char] = &['.', '_', '+', '-', '#', '[', ']', '<', '>'];

/// Invariant: client identifiers are non-empty, bounded and never contain
/// the storage key separator.
pub fn invariant_valid_client_id(id: &str) -> Result<(), ClientError> {
    let reject = |reason: &str| ClientError::InvalidClientId {
        id: id.to_string(),
        reason: reason.to_string(),
    };

    if id.is_empty() {
        return Err(reject("empty identifier"));
    }
    if id.len() > MAX_CLIENT_ID_LEN {
        return Err(reject("identifier longer than 64 characters"));
    }
    if let Some(c) = id
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !CLIENT_ID_EXTRA_CHARS.contains(c))
    {
        return Err(reject(&format!("invalid character {c:?}")));
    }
    Ok(())
}

/// Invariant: commitment roots carry at least one byte.
pub fn invariant_non_empty_root(root: &CommitmentRoot) -> Result<(), ValidationError> {
    if root.is_empty() {
        return Err(ValidationError::InconsistentState(
            "empty commitment root".to_string(),
        ));
    }
    Ok(())
}

/// Invariant: the verified roots contain the latest height.
pub fn invariant_latest_root_recorded(
    verified_roots: &BTreeMap<Height, VerifiedRoot>,
    latest_height: Height,
) -> bool {
    verified_roots.contains_key(&latest_height)
}

/// Invariant: an existing entry is never overwritten with a different root.
///
/// Returns `true` if `root` may be recorded at `height`.
pub fn invariant_no_root_overwrite(
    verified_roots: &BTreeMap<Height, VerifiedRoot>,
    height: Height,
    root: &CommitmentRoot,
) -> bool {
    verified_roots
        .get(&height)
        .map_or(true, |existing| &existing.root == root)
}
