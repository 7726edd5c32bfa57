//! # Adapters Module
//!
//! Storage-side implementations used by the client manager.
//!
//! ## Modules
//!
//! - `storage`: `InMemoryKVStore` and the persisted key layout
//! - `codec`: bincode encoding of persisted records

pub mod codec;
pub mod storage;

pub use codec::{BincodeRecordCodec, ClientRecord};
pub use storage::{keys, InMemoryKVStore};
