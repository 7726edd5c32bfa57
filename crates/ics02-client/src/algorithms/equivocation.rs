//! # Equivocation Detection
//!
//! Two authentic headers from the same trusted state must never disagree
//! about a height. Disagreement is evidence the counterparty's signers
//! equivocated.

use crate::domain::Header;

/// Whether two headers make conflicting claims.
///
/// Conflicting means the same height with a different root, or the same
/// height and root with a different proposed next consensus state
/// (e.g. two validator-set transitions from one prior state). Headers at
/// different heights never conflict here; a strict extension is not
/// misbehaviour. Symmetric in `a` and `b`.
pub fn claims_conflict(a: &Header, b: &Header) -> bool {
    a.height == b.height && !a.same_claim(b)
}
