//! Handler configuration
//!
//! The handler itself is stateless; these settings only select between the
//! legacy behavior and its stricter redesign.

use clap::ValueEnum;

/// How balance values and transfer amounts are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DecodeMode {
    /// Any value that is not a base-10 `i64` fails with `ValueDecode`
    #[default]
    Strict,

    /// Undecodable values are treated as zero (historical behavior)
    Lenient,
}

/// How a handler's writes reach the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WriteMode {
    /// Writes are staged and committed together once the handler succeeds
    #[default]
    Atomic,

    /// Writes go straight to the ledger; a failure keeps earlier writes
    Direct,
}

/// Configuration for a [`LedgerHandler`](crate::core::LedgerHandler)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandlerConfig {
    /// Decoding policy for `Transfer`
    pub decode_mode: DecodeMode,

    /// Commit policy for every mutating operation
    pub write_mode: WriteMode,
}

impl HandlerConfig {
    /// Create a configuration from explicit modes
    pub fn new(decode_mode: DecodeMode, write_mode: WriteMode) -> Self {
        Self {
            decode_mode,
            write_mode,
        }
    }

    /// The historical behavior: lenient decoding and unstaged writes
    pub fn legacy() -> Self {
        Self::new(DecodeMode::Lenient, WriteMode::Direct)
    }
}
