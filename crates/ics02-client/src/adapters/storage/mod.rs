//! Storage Adapters
//!
//! Implementations of the `KeyValueStore` trait and the key layout.

pub mod keys;
mod memory;

pub use memory::InMemoryKVStore;
