//! # Root Retention
//!
//! Chooses which verified roots to evict under a [`RetentionPolicy`].

use std::collections::BTreeMap;

use crate::config::RetentionPolicy;
use crate::domain::{Height, HostHeight, VerifiedRoot};

/// Heights to evict, ascending.
///
/// Roots older than `max_age` host heights go first, then the lowest
/// heights until at most `max_roots` remain. Heights in `pinned` are never
/// selected and still occupy their slots.
pub fn select_evictions(
    verified_roots: &BTreeMap<Height, VerifiedRoot>,
    pinned: &[Height],
    policy: &RetentionPolicy,
    host_height: HostHeight,
) -> Vec<Height> {
    if policy.is_unbounded() {
        return Vec::new();
    }

    let mut evicted = Vec::new();
    let mut kept = Vec::new();
    for (height, entry) in verified_roots {
        if pinned.contains(height) {
            continue;
        }
        let expired = policy
            .max_age
            .is_some_and(|max_age| host_height.saturating_sub(entry.recorded_at) > max_age);
        if expired {
            evicted.push(*height);
        } else {
            kept.push(*height);
        }
    }

    if let Some(max_roots) = policy.max_roots {
        let mut pinned_slots = pinned.to_vec();
        pinned_slots.sort_unstable();
        pinned_slots.dedup();
        pinned_slots.retain(|h| verified_roots.contains_key(h));
        let allowed = max_roots.saturating_sub(pinned_slots.len());
        if kept.len() > allowed {
            let excess = kept.len() - allowed;
            evicted.extend(kept.drain(..excess));
        }
    }

    evicted.sort_unstable();
    evicted
}
