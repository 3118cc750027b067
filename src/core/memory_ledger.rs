//! In-memory ledger backend
//!
//! This module provides the `MemoryLedger` struct, a single-threaded key-value
//! store used by the synchronous replay strategy and by tests.
//!
//! The MemoryLedger is responsible for:
//! - Storing opaque byte values under string keys
//! - Rejecting empty keys, as production ledgers do
//! - Providing sorted snapshots for output

use crate::core::traits::{BatchRejection, Ledger, WriteOp};
use crate::types::StoreError;
use std::collections::HashMap;

/// Reject keys the ledger cannot address
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::invalid_key(key, "key must not be an empty string"));
    }
    Ok(())
}

/// Check every key of a batch before any of it is applied
pub(crate) fn validate_batch(ops: &[WriteOp]) -> Result<(), BatchRejection> {
    for op in ops {
        validate_key(op.key()).map_err(|e| BatchRejection::new(op.clone(), e))?;
    }
    Ok(())
}

/// Single-threaded key-value ledger
///
/// Holds every entry in a HashMap. Reads and writes never fail except for
/// empty keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    /// Map of keys to stored values
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        MemoryLedger {
            entries: HashMap::new(),
        }
    }

    /// Create a ledger pre-populated with string entries
    ///
    /// # Examples
    ///
    /// ```
    /// use ledger_handler::core::{Ledger, MemoryLedger};
    ///
    /// let ledger = MemoryLedger::with_entries([("A", "100"), ("B", "50")]);
    /// assert_eq!(ledger.get("A").unwrap(), Some(b"100".to_vec()));
    /// ```
    pub fn with_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        MemoryLedger {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
                .collect(),
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
            .map(|value| String::from_utf8_lossy(value).into_owned())
    }

    /// All entries sorted by key
    ///
    /// Provides deterministic output for CSV generation.
    pub fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        let mut entries: Vec<(String, Vec<u8>)> = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Ledger for MemoryLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
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

    /// Validates every key up front so the batch lands all-or-nothing
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
