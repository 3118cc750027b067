//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `invocation`: operations, entry points and script steps
//! - `config`: handler configuration
//! - `error`: error types for the handler and ledger backends

pub mod config;
pub mod error;
pub mod invocation;

pub use config::{DecodeMode, HandlerConfig, WriteMode};
pub use error::{HandlerError, StoreError};
pub use invocation::{EntryKind, InvocationRecord, Operation, Payload, ScriptStep};
