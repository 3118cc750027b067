//! Core traits for ledger access and invocation entry points
//!
//! This module defines the trait abstractions that let the handlers run against
//! any key-value backend, and that let the primary and legacy entry points share
//! a single dispatch implementation.

use crate::core::engine::LedgerHandler;
use crate::types::{HandlerError, Payload, StoreError};
use thiserror::Error;
use tracing::debug;

/// A single mutation waiting to be applied to a ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Store `value` under `key`
    Put { key: String, value: Vec<u8> },

    /// Remove `key`
    Delete { key: String },
}

impl WriteOp {
    /// The key this operation touches
    pub fn key(&self) -> &str {
        match self {
            WriteOp::Put { key, .. } | WriteOp::Delete { key } => key,
        }
    }
}

/// A staged write the ledger refused while applying a batch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ledger refused staged write to '{}': {}", .op.key(), .source)]
pub struct BatchRejection {
    /// The refused write
    pub op: WriteOp,

    /// The ledger's reason
    pub source: StoreError,
}

impl BatchRejection {
    /// Pair a refused write with the ledger's error
    pub fn new(op: WriteOp, source: StoreError) -> Self {
        Self { op, source }
    }
}

impl From<BatchRejection> for HandlerError {
    fn from(rejection: BatchRejection) -> Self {
        match rejection.op {
            WriteOp::Put { key, .. } => HandlerError::storage_write(&key, rejection.source),
            WriteOp::Delete { key } => HandlerError::storage_delete(&key, rejection.source),
        }
    }
}

/// Key-value accessor the handlers read and write through
///
/// Implementations must provide read-your-writes consistency within one
/// invocation. Deleting an absent key is not an error.
pub trait Ledger {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key`
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;

    /// Apply a batch of staged writes in order
    ///
    /// Backends with native multi-key transactions should override this so the
    /// batch lands all-or-nothing. The default applies each write in turn and
    /// stops at the first failure.
    fn apply_batch(&mut self, ops: Vec<WriteOp>) -> Result<(), BatchRejection> {
        for op in ops {
            let result = match &op {
                WriteOp::Put { key, value } => self.put(key, value),
                WriteOp::Delete { key } => self.delete(key),
            };
            result.map_err(|e| BatchRejection::new(op, e))?;
        }
        Ok(())
    }
}

/// An externally visible invocation entry point
///
/// The hosting runtime exposes more than one entry point that routes operation
/// names to handlers. They all go through [`LedgerHandler::dispatch`]; an entry
/// point only contributes its name for diagnostics.
pub trait EntryPoint {
    /// Name the runtime knows this entry point by
    fn name(&self) -> &'static str;

    /// Route `function` with `args` to its handler
    fn call<L: Ledger>(
        &self,
        handler: &LedgerHandler,
        ledger: &mut L,
        function: &str,
        args: &[String],
    ) -> Result<Payload, HandlerError> {
        debug!(entry = self.name(), function, "determining function");
        handler.dispatch(ledger, function, args)
    }
}

/// The primary `invoke` entry point
#[derive(Debug, Clone, Copy, Default)]
pub struct InvokeEntry;

impl EntryPoint for InvokeEntry {
    fn name(&self) -> &'static str {
        "invoke"
    }
}

/// The legacy `run` entry point, kept for older callers
#[derive(Debug, Clone, Copy, Default)]
pub struct RunEntry;

impl EntryPoint for RunEntry {
    fn name(&self) -> &'static str {
        "run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::FaultyLedger;

    fn put(key: &str, value: &str) -> WriteOp {
        WriteOp::Put {
            key: key.to_string(),
            value: value.as_bytes().to_vec(),
        }
    }

    /// Uses the trait's default `apply_batch`
    struct PlainLedger(FaultyLedger);

    impl Ledger for PlainLedger {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.0.get(key)
        }

        fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            self.0.put(key, value)
        }

        fn delete(&mut self, key: &str) -> Result<(), StoreError> {
            self.0.delete(key)
        }
    }

    #[test]
    fn test_default_apply_batch_stops_at_rejected_write() {
        let mut ledger = PlainLedger(FaultyLedger::default().failing_put("B"));

        let result = ledger.apply_batch(vec![put("A", "1"), put("B", "2"), put("C", "3")]);

        assert_eq!(
            result,
            Err(BatchRejection::new(
                put("B", "2"),
                StoreError::unavailable("injected fault")
            ))
        );
        assert_eq!(ledger.0.writes, vec!["A"]);
    }

    #[test]
    fn test_rejection_maps_to_storage_error_by_write_kind() {
        let fault = StoreError::unavailable("injected fault");

        let put_error = HandlerError::from(BatchRejection::new(put("A", "1"), fault.clone()));
        assert_eq!(put_error, HandlerError::storage_write("A", fault.clone()));

        let delete = WriteOp::Delete {
            key: "A".to_string(),
        };
        let delete_error = HandlerError::from(BatchRejection::new(delete, fault.clone()));
        assert_eq!(delete_error, HandlerError::storage_delete("A", fault));
    }

    #[test]
    fn test_rejection_display_names_key() {
        let rejection = BatchRejection::new(put("A", "1"), StoreError::unavailable("down"));
        assert_eq!(
            rejection.to_string(),
            "ledger refused staged write to 'A': ledger unavailable: down"
        );
    }
}
