//! # Integration Tests
//!
//! End-to-end flows through `ClientManager`.

pub mod lifecycle;
pub mod properties;
