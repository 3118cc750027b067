//! Replay strategy module
//!
//! A strategy owns the whole replay pipeline: reading the invocation script,
//! running every step through a `LedgerHandler`, and writing the final ledger
//! dump. Synchronous and asynchronous implementations are selected at runtime.

use crate::cli::StrategyType;
use crate::types::HandlerConfig;
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Complete replay pipeline
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the script at `input_path` and write the final ledger to `output`
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the script was replayed, even if some steps failed
    /// * `Err(String)` if a fatal error occurred (file not found, output error, etc.)
    ///
    /// Malformed rows and failed invocations are logged with `tracing::warn!`
    /// and replay continues with the next step.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a replay strategy
///
/// `batch_config` is only used by the async strategy; `None` selects the
/// defaults.
pub fn create_strategy(
    strategy_type: StrategyType,
    handler_config: HandlerConfig,
    batch_config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(handler_config)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            handler_config,
            batch_config.unwrap_or_default(),
        )),
    }
}
