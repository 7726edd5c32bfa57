//! # Application Module
//!
//! The client manager orchestrating predicates, storage and pruning.

pub mod service;

pub use service::ClientManager;
