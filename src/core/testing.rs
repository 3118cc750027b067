//! Fault injection for handler tests

use crate::core::memory_ledger::MemoryLedger;
use crate::core::traits::{BatchRejection, Ledger, WriteOp};
use crate::types::StoreError;

/// Wraps a `MemoryLedger`, failing calls on chosen keys and recording writes
#[derive(Debug, Default)]
pub(crate) struct FaultyLedger {
    pub inner: MemoryLedger,
    fail_get: Option<String>,
    fail_put: Option<String>,
    fail_delete: Option<String>,
    /// Keys successfully written or deleted, in order
    pub writes: Vec<String>,
}

impl FaultyLedger {
    pub fn new(inner: MemoryLedger) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn failing_get(mut self, key: &str) -> Self {
        self.fail_get = Some(key.to_string());
        self
    }

    pub fn failing_put(mut self, key: &str) -> Self {
        self.fail_put = Some(key.to_string());
        self
    }

    pub fn failing_delete(mut self, key: &str) -> Self {
        self.fail_delete = Some(key.to_string());
        self
    }
}

fn injected(target: &Option<String>, key: &str) -> Result<(), StoreError> {
    match target {
        Some(k) if k == key => Err(StoreError::unavailable("injected fault")),
        _ => Ok(()),
    }
}

impl Ledger for FaultyLedger {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        injected(&self.fail_get, key)?;
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        injected(&self.fail_put, key)?;
        self.inner.put(key, value)?;
        self.writes.push(key.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        injected(&self.fail_delete, key)?;
        self.inner.delete(key)?;
        self.writes.push(key.to_string());
        Ok(())
    }

    /// Rejects the whole batch if any write would hit an injected fault
    fn apply_batch(&mut self, ops: Vec<WriteOp>) -> Result<(), BatchRejection> {
        for op in &ops {
            let target = match op {
                WriteOp::Put { .. } => &self.fail_put,
                WriteOp::Delete { .. } => &self.fail_delete,
            };
            injected(target, op.key()).map_err(|e| BatchRejection::new(op.clone(), e))?;
        }
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
