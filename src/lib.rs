//! Ledger Handler Library
//! # Overview
//!
//! A stateless invocation handler over a key-value ledger, plus a replay
//! harness that drives it from CSV invocation scripts with either a sync or
//! an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Operations, entry points, configuration and errors
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::handlers`] - Initialize, Transfer, DeleteEntity and Query
//!   - [`core::engine`] - `LedgerHandler`: dispatch and write-mode handling
//!   - [`core::traits`] - The `Ledger` accessor and `EntryPoint` abstractions
//!   - [`core::memory_ledger`], [`core::r#async`] - Ledger backends
//! - [`io`] - Script readers and the ledger dump writer
//! - [`strategy`] - Complete replay pipelines
//!
//! # Operations
//!
//! - **init**: Store the four configuration fields from eight arguments
//! - **invoke**: Move an amount from one entity's balance to another's
//! - **delete**: Remove an entity from the ledger
//!
//! `query` is a diagnostic stub: it validates its input and returns no payload.
//!
//! ```
//! use ledger_handler::{Ledger, LedgerHandler, MemoryLedger};
//!
//! let mut ledger = MemoryLedger::with_entries([("A", "100"), ("B", "50")]);
//! let handler = LedgerHandler::default();
//! let args = ["A", "B", "10"].map(String::from);
//!
//! handler.invoke(&mut ledger, "invoke", &args).unwrap();
//! assert_eq!(ledger.get("A").unwrap(), Some(b"90".to_vec()));
//! assert_eq!(ledger.get("B").unwrap(), Some(b"62".to_vec()));
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{Ledger, LedgerHandler, MemoryLedger, SharedLedger};
pub use crate::io::write_ledger_csv;
pub use crate::types::{
    DecodeMode, EntryKind, HandlerConfig, HandlerError, InvocationRecord, Operation, Payload,
    ScriptStep, StoreError, WriteMode,
};
