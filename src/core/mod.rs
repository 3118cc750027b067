//! Core business logic module
//!
//! This module contains the invocation processing components:
//! - `traits` - Ledger accessor and entry point abstractions
//! - `handlers` - The Initialize, Transfer, DeleteEntity and Query handlers
//! - `engine` - Operation dispatch and write-mode handling
//! - `memory_ledger` - Single-threaded ledger backend
//! - `staged_ledger` - Write staging for atomic invocations
//! - `async` - Thread-safe backend and batch execution

pub mod r#async;
pub mod engine;
pub mod handlers;
pub mod memory_ledger;
pub mod staged_ledger;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::LedgerHandler;
pub use memory_ledger::MemoryLedger;
pub use r#async::{BatchExecutor, BatchSummary, SharedLedger};
pub use staged_ledger::StagedLedger;
pub use traits::{BatchRejection, EntryPoint, InvokeEntry, Ledger, RunEntry, WriteOp};
