//! # Client Manager Configuration
//!
//! Which client kinds may be created and how long verified roots are kept.

use std::env;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ClientKind, HostHeight};

/// Retention policy for verified roots.
///
/// Both bounds are optional; `None` disables that bound. The root at a
/// client's latest height is kept regardless.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Maximum number of verified roots kept per client.
    pub max_roots: Option<usize>,

    /// Maximum age of a verified root, in host-height units.
    pub max_age: Option<HostHeight>,
}

impl RetentionPolicy {
    /// Keep every root.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Whether this policy ever evicts anything.
    pub fn is_unbounded(&self) -> bool {
        self.max_roots.is_none() && self.max_age.is_none()
    }
}

/// Client manager configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Kinds accepted by `create_client`. Kinds must also be registered.
    pub allowed_kinds: Vec<ClientKind>,

    /// Verified root retention.
    pub retention: RetentionPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            allowed_kinds: ClientKind::ALL.to_vec(),
            retention: RetentionPolicy {
                max_roots: Some(DEFAULT_MAX_ROOTS),
                max_age: None,
            },
        }
    }
}

/// Default per-client root cap.
pub const DEFAULT_MAX_ROOTS: usize = 10_000;

impl ClientConfig {
    /// Create a config for testing: every kind, nothing pruned.
    pub fn for_testing() -> Self {
        Self {
            allowed_kinds: ClientKind::ALL.to_vec(),
            retention: RetentionPolicy::unbounded(),
        }
    }

    /// Load from environment, falling back to [`Default`] per field.
    ///
    /// - `ICS02_ALLOWED_KINDS`: comma-separated kind names
    /// - `ICS02_MAX_ROOTS`: root cap, `0` or `none` to disable
    /// - `ICS02_MAX_ROOT_AGE`: age bound in host heights, `0` or `none` to disable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_kinds = env::var("ICS02_ALLOWED_KINDS")
            .ok()
            .and_then(|v| parse_kinds(&v))
            .unwrap_or(defaults.allowed_kinds);

        let max_roots = env::var("ICS02_MAX_ROOTS")
            .ok()
            .and_then(|v| parse_bound("ICS02_MAX_ROOTS", &v))
            .unwrap_or(defaults.retention.max_roots);

        let max_age = env::var("ICS02_MAX_ROOT_AGE")
            .ok()
            .and_then(|v| parse_bound("ICS02_MAX_ROOT_AGE", &v))
            .unwrap_or(defaults.retention.max_age);

        Self {
            allowed_kinds,
            retention: RetentionPolicy { max_roots, max_age },
        }
    }

    /// Whether `kind` may be created under this config.
    pub fn allows(&self, kind: ClientKind) -> bool {
        self.allowed_kinds.contains(&kind)
    }
}

fn parse_kinds(value: &str) -> Option<Vec<ClientKind>> {
    let mut kinds = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        match name.parse::<ClientKind>() {
            Ok(kind) if !kinds.contains(&kind) => kinds.push(kind),
            Ok(_) => {}
            Err(e) => {
                warn!("[ics02] Ignoring ICS02_ALLOWED_KINDS: {}", e);
                return None;
            }
        }
    }
    Some(kinds)
}

/// `Some(None)` disables the bound, `None` keeps the default.
fn parse_bound<T: std::str::FromStr + PartialEq + Default>(
    var: &str,
    value: &str,
) -> Option<Option<T>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    match value.parse::<T>() {
        Ok(n) if n == T::default() => Some(None),
        Ok(n) => Some(Some(n)),
        Err(_) => {
            warn!("[ics02] Ignoring {}: {:?} is not a number", var, value);
            None
        }
    }
}
