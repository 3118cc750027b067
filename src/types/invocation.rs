//! Invocation-related types
//!
//! An invocation is one call from the hosting runtime into the handler: an entry
//! point, an operation name and an ordered list of string arguments. The replay
//! harness additionally knows a `seed` step, which stands in for the external
//! process that provisions balance entries.

use crate::types::HandlerError;
use std::fmt;

/// Bytes returned to the caller on success
///
/// Every operation currently returns `None`; the type keeps the runtime-facing
/// signature honest about what a handler is allowed to return.
pub type Payload = Option<Vec<u8>>;

/// Operations the dispatcher can route to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Write the four configuration entries (`"init"`)
    Initialize,

    /// Move an amount between two balance entries (`"invoke"`)
    Transfer,

    /// Remove a single entry (`"delete"`)
    DeleteEntity,
}

impl Operation {
    /// Resolve an operation from its wire name
    ///
    /// Matching is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns `HandlerError::UnknownOperation` carrying the submitted name when it
    /// is not one of `init`, `invoke` or `delete`.
    pub fn from_name(name: &str) -> Result<Self, HandlerError> {
        match name {
            "init" => Ok(Operation::Initialize),
            "invoke" => Ok(Operation::Transfer),
            "delete" => Ok(Operation::DeleteEntity),
            _ => Err(HandlerError::unknown_operation(name)),
        }
    }

    /// The wire name of this operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Initialize => "init",
            Operation::Transfer => "invoke",
            Operation::DeleteEntity => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runtime entry point an invocation arrives through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Deployment-time initialization; the function name is ignored
    Init,

    /// Primary invocation entry point
    Invoke,

    /// Legacy alias of `Invoke`, dispatched identically
    Run,

    /// Read path
    Query,
}

impl EntryKind {
    /// Resolve an entry point from its script name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "init" => Some(EntryKind::Init),
            "invoke" => Some(EntryKind::Invoke),
            "run" => Some(EntryKind::Run),
            "query" => Some(EntryKind::Query),
            _ => None,
        }
    }
}

/// A single call into the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    /// Entry point the call arrives through
    pub entry: EntryKind,

    /// Operation name submitted by the caller
    pub function: String,

    /// Positional arguments, passed through verbatim
    pub args: Vec<String>,
}

impl InvocationRecord {
    /// Build a record from borrowed parts
    pub fn new(entry: EntryKind, function: &str, args: &[&str]) -> Self {
        Self {
            entry,
            function: function.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }
}

/// One step of an invocation script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Provision an entry directly, bypassing the handler
    Seed {
        /// Key to write
        key: String,
        /// Value to store
        value: String,
    },

    /// Call into the handler
    Call(InvocationRecord),
}
