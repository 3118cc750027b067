//! Batch replay on blocking workers
//!
//! This module provides the `BatchExecutor` struct, which replays batches of
//! script steps against a `SharedLedger` on tokio's blocking thread pool.
//!
//! # Design
//!
//! Invocations may touch any key, so there is no safe way to partition a batch:
//! steps within a batch run strictly in order, and the caller must await one
//! batch before spawning the next. What the executor buys is overlap: the
//! async reader can parse batch N+1 while batch N executes.
//!
//! # Architecture
//!
//! ```text
//! BatchExecutor
//!     ├── LedgerHandler (stateless, Copy)
//!     └── SharedLedger  (Arc<DashMap> handle)
//! ```

use super::SharedLedger;
use crate::core::engine::LedgerHandler;
use crate::types::{HandlerError, ScriptStep};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outcome counts for one replayed batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Steps that completed successfully
    pub applied: usize,

    /// Steps that returned an error (logged and skipped)
    pub failed: usize,
}

impl BatchSummary {
    /// Fold another summary into this one
    pub fn merge(&mut self, other: BatchSummary) {
        self.applied += other.applied;
        self.failed += other.failed;
    }
}

/// Replays script batches against a shared ledger
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    handler: LedgerHandler,
    ledger: SharedLedger,
}

impl BatchExecutor {
    /// Create an executor writing to `ledger`
    pub fn new(handler: LedgerHandler, ledger: SharedLedger) -> Self {
        Self { handler, ledger }
    }

    /// Replay a single step, returning its result
    pub fn execute_step(&self, step: &ScriptStep) -> Result<(), HandlerError> {
        let mut ledger = self.ledger.clone();
        let payload = self.handler.replay(&mut ledger, step)?;
        if let Some(bytes) = payload {
            debug!(len = bytes.len(), "invocation returned payload");
        }
        Ok(())
    }

    /// Replay every step in order on the current thread
    ///
    /// A failing step is logged and counted; later steps still run.
    pub fn execute_batch(&self, steps: Vec<ScriptStep>) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for step in &steps {
            match self.execute_step(step) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    warn!(error = %e, ?step, "invocation failed");
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// Replay a batch on the blocking thread pool
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, steps: Vec<ScriptStep>) -> JoinHandle<BatchSummary> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.execute_batch(steps))
    }
}
