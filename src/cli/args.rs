use crate::strategy::BatchConfig;
use crate::types::{DecodeMode, HandlerConfig, WriteMode};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger handler invocations from a CSV script
#[derive(Parser, Debug)]
#[command(name = "ledger-handler")]
#[command(about = "Replay ledger handler invocations and dump the resulting ledger", long_about = None)]
pub struct CliArgs {
    /// Invocation script path
    #[arg(value_name = "INPUT", help = "Path to the invocation script CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' for single-threaded or 'async' for batched replay"
    )]
    pub strategy: StrategyType,

    /// Decoding policy for balances and amounts
    #[arg(
        long = "decoding",
        value_name = "MODE",
        default_value = "strict",
        help = "Value decoding: 'strict' rejects non-integers, 'lenient' clamps out-of-range values and zeroes the rest"
    )]
    pub decoding: DecodeMode,

    /// Commit policy for handler writes
    #[arg(
        long = "writes",
        value_name = "MODE",
        default_value = "atomic",
        help = "Write mode: 'atomic' commits all writes together, 'direct' writes immediately"
    )]
    pub writes: WriteMode,

    /// Number of script steps per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of script steps per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of runtime worker threads (async mode only)
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,

    /// Default log level when RUST_LOG is not set
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Log level for stderr diagnostics (overridden by RUST_LOG)"
    )]
    pub log_level: String,
}

/// Available replay strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Build the async batch configuration
    ///
    /// Unset values take their defaults; zero values are replaced by
    /// `BatchConfig::new` with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_none() && self.worker_threads.is_none() {
            return BatchConfig::default();
        }

        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.worker_threads.unwrap_or(default.worker_threads),
        )
    }

    /// Build the handler configuration
    pub fn to_handler_config(&self) -> HandlerConfig {
        HandlerConfig::new(self.decoding, self.writes)
    }
}
