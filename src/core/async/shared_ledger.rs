//! Thread-safe ledger backend
//!
//! This module provides the `SharedLedger` struct, a key-value ledger that can be
//! shared across threads and async tasks.
//!
//! # Design
//!
//! `SharedLedger` wraps an `Arc<DashMap>`. Cloning the ledger clones the handle,
//! not the data: every clone reads and writes the same entries. DashMap shards
//! its locks, so operations on different keys proceed in parallel while
//! operations on the same key are serialized.
//!
//! # Thread Safety
//!
//! Individual get/put/delete calls are atomic. Sequences of calls are not: a
//! `Transfer` running on one clone can interleave with another invocation on a
//! different clone between its reads and its writes.

use crate::core::memory_ledger::{validate_batch, validate_key};
use crate::core::traits::{BatchRejection, Ledger, WriteOp};
use crate::types::StoreError;
use dashmap::DashMap;
use std::sync::Arc;

/// Cloneable handle to a concurrent ledger
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    /// Concurrent map of keys to stored values
    entries: Arc<DashMap<String, Vec<u8>>>,
}

impl SharedLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a value as a UTF-8 string (lossy), `None` if absent
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.entries
            .get(key)
            .map(|entry| String::from_utf8_lossy(entry.value()).into_owned())
    }

    /// All entries sorted by key
    ///
    /// The snapshot is taken shard by shard; writes racing with it may or may
    /// not be included.
    pub fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        let mut entries: Vec<(String, Vec<u8>)> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Ledger for SharedLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }

    /// Validates every key up front; other clones may observe the batch
    /// part-way through being applied
    fn apply_batch(&mut self, ops: Vec<WriteOp>) -> Result<(), BatchRejection> {
        validate_batch(&ops)?;
        for op in ops {
            match op {
                WriteOp::Put { key, value } => {
                    self.entries.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    self.entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}
