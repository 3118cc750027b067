//! Asynchronous implementations of core components
//!
//! This module provides the thread-safe pieces used by the async replay
//! strategy, built on DashMap for locking.
//!
//! # Architecture
//!
//! - **SharedLedger**: cloneable handle to a DashMap-backed ledger
//! - **BatchExecutor**: replays batches of script steps on a blocking worker
//!
//! # Thread Safety
//!
//! A `SharedLedger` can be cloned into any number of tasks. Single-key
//! operations are synchronized by DashMap's shards; multi-step invocations are
//! not isolated from each other, so the executor runs steps one at a time.

pub mod batch_executor;
pub mod shared_ledger;

pub use batch_executor::{BatchExecutor, BatchSummary};
pub use shared_ledger::SharedLedger;
