//! # ICS-02 Light Client Test Suite
//!
//! Drives the client manager through its public API only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Simulated counterparty chains and manager setup
//! └── integration/
//!     ├── scenarios.rs  # Create / update / misbehaviour / verify walkthroughs
//!     ├── lifecycle.rs  # Backfill, pruning, key rotation, dispatch, config
//!     └── properties.rs # proptest: freeze, atomicity, persistence, symmetry
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ics02-tests
//!
//! # With logs
//! RUST_LOG=ics02_client=debug cargo test -p ics02-tests -- --nocapture
//! ```

pub mod fixtures;
pub mod integration;
