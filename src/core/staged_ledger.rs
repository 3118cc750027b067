//! Write staging for atomic invocations
//!
//! This module provides the `StagedLedger` overlay. A handler running against a
//! staged ledger sees its own writes immediately, but nothing reaches the
//! underlying ledger until [`StagedLedger::commit`] hands the whole batch over
//! through [`Ledger::apply_batch`]. Dropping the overlay without committing
//! discards every staged write.
//!
//! # Read-your-writes
//!
//! Reads consult the staged writes newest-first and fall back to the underlying
//! ledger only for keys this invocation has not touched.

use crate::core::traits::{Ledger, WriteOp};
use crate::types::{HandlerError, StoreError};

/// Overlay that buffers writes until commit
#[derive(Debug)]
pub struct StagedLedger<'a, L: Ledger + ?Sized> {
    /// Ledger the batch is committed to
    inner: &'a mut L,

    /// Writes in submission order
    pending: Vec<WriteOp>,
}

impl<'a, L: Ledger + ?Sized> StagedLedger<'a, L> {
    /// Start staging on top of `inner`
    pub fn new(inner: &'a mut L) -> Self {
        StagedLedger {
            inner,
            pending: Vec::new(),
        }
    }

    /// Number of writes waiting for commit
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Hand every staged write to the underlying ledger
    ///
    /// # Errors
    ///
    /// Returns the storage error of the first write the underlying ledger
    /// rejects. How much of the batch survives such a failure depends on the
    /// backend's `apply_batch`.
    pub fn commit(self) -> Result<(), HandlerError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.inner
            .apply_batch(self.pending)
            .map_err(HandlerError::from)
    }

    /// Drop every staged write, returning how many were discarded
    pub fn discard(self) -> usize {
        self.pending.len()
    }
}

impl<L: Ledger + ?Sized> Ledger for StagedLedger<'_, L> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let staged = self.pending.iter().rev().find(|op| op.key() == key);
        match staged {
            Some(WriteOp::Put { value, .. }) => Ok(Some(value.clone())),
            Some(WriteOp::Delete { .. }) => Ok(None),
            None => self.inner.get(key),
        }
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.pending.push(WriteOp::Put {
            key: key.to_string(),
            value: value.to_vec(),
        });
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.pending.push(WriteOp::Delete {
            key: key.to_string(),
        });
        Ok(())
    }
}
