//! Error types for the ledger handler
//!
//! This module defines every error an invocation can surface to its caller.
//! Errors carry enough context (operation, key, offending value) to be logged
//! as-is by the hosting runtime or the replay harness.
//!
//! # Error Categories
//!
//! - **Invocation Errors**: wrong argument count, unknown operation names
//! - **State Errors**: a referenced entry is absent or does not decode
//! - **Storage Errors**: the ledger accessor itself failed a get, put or delete
//! - **Arithmetic Errors**: a balance update would leave the `i64` range

use thiserror::Error;

/// Failure reported by a ledger backend
///
/// This is what a [`Ledger`](crate::core::Ledger) implementation returns when the
/// underlying store cannot serve a request. Handlers never inspect it; they wrap it
/// in the matching [`HandlerError`] storage variant together with the key involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused to serve the request
    #[error("ledger unavailable: {message}")]
    Unavailable {
        /// Backend-provided description
        message: String,
    },

    /// The backend rejected the key itself (for example an empty key)
    #[error("ledger rejected key '{key}': {message}")]
    InvalidKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        message: String,
    },
}

impl StoreError {
    /// Create an Unavailable error
    pub fn unavailable(message: &str) -> Self {
        StoreError::Unavailable {
            message: message.to_string(),
        }
    }

    /// Create an InvalidKey error
    pub fn invalid_key(key: &str, message: &str) -> Self {
        StoreError::InvalidKey {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// Main error type for ledger invocations
///
/// Every handler fails fast on the first error and returns it unwrapped.
/// No variant is retried inside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The operation received the wrong number of positional arguments
    #[error("Incorrect number of arguments for {operation}: expecting {expected}, got {actual}")]
    ArgumentCount {
        /// Operation that rejected the arguments
        operation: String,
        /// Required argument count
        expected: usize,
        /// Submitted argument count
        actual: usize,
    },

    /// The dispatcher does not know the submitted operation name
    #[error("Received unknown function invocation '{name}'")]
    UnknownOperation {
        /// The submitted operation name
        name: String,
    },

    /// The query entry point was called with a function other than `query`
    #[error("Invalid query function name '{name}', expecting \"query\"")]
    InvalidQueryFunction {
        /// The submitted function name
        name: String,
    },

    /// A key that must exist is absent from the ledger
    #[error("Entity not found: {key}")]
    EntityNotFound {
        /// The missing key
        key: String,
    },

    /// A stored value or an argument is not a base-10 integer
    #[error("Expecting integer value for {key}, got '{value}'")]
    ValueDecode {
        /// Ledger key (or argument name) holding the value
        key: String,
        /// The raw value, rendered lossily as UTF-8
        value: String,
    },

    /// A balance computation would overflow `i64`
    #[error("Arithmetic overflow in {operation} for {key}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Balance key being updated
        key: String,
    },

    /// The ledger failed to read a key
    #[error("Failed to get state for {key}: {source}")]
    StorageRead {
        /// Key being read
        key: String,
        /// Backend failure
        source: StoreError,
    },

    /// The ledger failed to write a key
    #[error("Failed to put state for {key}: {source}")]
    StorageWrite {
        /// Key being written
        key: String,
        /// Backend failure
        source: StoreError,
    },

    /// The ledger failed to delete a key
    #[error("Failed to delete state for {key}: {source}")]
    StorageDelete {
        /// Key being deleted
        key: String,
        /// Backend failure
        source: StoreError,
    },
}

// Helper functions for creating common errors

impl HandlerError {
    /// Create an ArgumentCount error
    pub fn argument_count(operation: &str, expected: usize, actual: usize) -> Self {
        HandlerError::ArgumentCount {
            operation: operation.to_string(),
            expected,
            actual,
        }
    }

    /// Create an UnknownOperation error
    pub fn unknown_operation(name: &str) -> Self {
        HandlerError::UnknownOperation {
            name: name.to_string(),
        }
    }

    /// Create an InvalidQueryFunction error
    pub fn invalid_query_function(name: &str) -> Self {
        HandlerError::InvalidQueryFunction {
            name: name.to_string(),
        }
    }

    /// Create an EntityNotFound error
    pub fn entity_not_found(key: &str) -> Self {
        HandlerError::EntityNotFound {
            key: key.to_string(),
        }
    }

    /// Create a ValueDecode error from raw bytes
    pub fn value_decode(key: &str, value: &[u8]) -> Self {
        HandlerError::ValueDecode {
            key: key.to_string(),
            value: String::from_utf8_lossy(value).into_owned(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, key: &str) -> Self {
        HandlerError::ArithmeticOverflow {
            operation: operation.to_string(),
            key: key.to_string(),
        }
    }

    /// Create a StorageRead error
    pub fn storage_read(key: &str, source: StoreError) -> Self {
        HandlerError::StorageRead {
            key: key.to_string(),
            source,
        }
    }

    /// Create a StorageWrite error
    pub fn storage_write(key: &str, source: StoreError) -> Self {
        HandlerError::StorageWrite {
            key: key.to_string(),
            source,
        }
    }

    /// Create a StorageDelete error
    pub fn storage_delete(key: &str, source: StoreError) -> Self {
        HandlerError::StorageDelete {
            key: key.to_string(),
            source,
        }
    }
}
