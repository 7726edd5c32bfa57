//! # Outbound Ports
//!
//! Host services the client manager depends on: the key-value store that
//! persists client records and the source of the current host height.

use crate::domain::{HostHeight, KVStoreError};

/// Abstract interface for the host's key-value store.
///
/// Production hosts back this with their state tree; tests use
/// [`crate::adapters::InMemoryKVStore`].
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either every operation in the batch is applied, or none is.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// All pairs whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key.
        key: Vec<u8>,
        /// Value.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key.
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Current height of the host chain.
///
/// Stamps verified roots and drives age-based pruning. Must be
/// deterministic across nodes: the block height, never a wall clock.
pub trait HostHeightSource: Send + Sync {
    /// Current host height.
    fn current(&self) -> HostHeight;
}

/// Host height fixed by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedHostHeight(pub HostHeight);

impl FixedHostHeight {
    /// Move to `height`.
    pub fn set(&mut self, height: HostHeight) {
        self.0 = height;
    }
}

impl HostHeightSource for FixedHostHeight {
    fn current(&self) -> HostHeight {
        self.0
    }
}
