//! Asynchronous batch replay strategy
//!
//! Reads the script in batches with `AsyncReader` and replays each batch on
//! tokio's blocking pool against a `SharedLedger`.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, worker_threads)
//!     ├── AsyncReader (batch script reading)
//!     └── BatchExecutor (spawn_blocking replay)
//!         ├── LedgerHandler
//!         └── SharedLedger (Arc<DashMap>)
//! ```
//!
//! # Pipelining
//!
//! While batch N is replayed, batch N+1 is parsed. Batch N is awaited before
//! batch N+1 is spawned, so steps still execute in script order and the final
//! ledger matches the synchronous strategy.

use crate::core::{BatchExecutor, BatchSummary, LedgerHandler, SharedLedger};
use crate::io::async_reader::AsyncReader;
use crate::io::script_format::write_ledger_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::HandlerConfig;
use std::io::Write;
use std::path::Path;
use tokio::task::JoinHandle;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::{debug, info, warn};

/// Configuration for batch replay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of script steps per batch
    pub batch_size: usize,
    /// Number of tokio worker threads
    pub worker_threads: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            worker_threads: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, worker_threads: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                default = default.batch_size,
                "invalid batch_size 0, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let worker_threads = if worker_threads == 0 {
            warn!(
                default = default.worker_threads,
                "invalid worker_threads 0, using default"
            );
            default.worker_threads
        } else {
            worker_threads
        };

        Self {
            batch_size,
            worker_threads,
        }
    }
}

/// Asynchronous, pipelined replay strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    handler: LedgerHandler,
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a strategy with the given handler and batch settings
    pub fn new(handler_config: HandlerConfig, config: BatchConfig) -> Self {
        Self {
            handler: LedgerHandler::new(handler_config),
            config,
        }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads.max(1))
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        runtime.block_on(async {
            let ledger = SharedLedger::new();
            let executor = BatchExecutor::new(self.handler, ledger.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;
            let mut reader = AsyncReader::new(file.compat());

            let mut summary = BatchSummary::default();
            let mut in_flight: Option<JoinHandle<BatchSummary>> = None;
            let mut batches = 0usize;

            loop {
                let batch = reader.read_batch(self.config.batch_size.max(1)).await;

                if let Some(handle) = in_flight.take() {
                    let done = handle
                        .await
                        .map_err(|e| format!("Batch worker failed: {}", e))?;
                    summary.merge(done);
                }

                if batch.is_empty() {
                    break;
                }

                batches += 1;
                debug!(batch = batches, steps = batch.len(), "spawning batch");
                in_flight = Some(executor.spawn(batch));
            }

            info!(
                batches,
                applied = summary.applied,
                failed = summary.failed,
                entries = ledger.len(),
                "replay finished"
            );

            write_ledger_csv(&ledger.snapshot(), output)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DecodeMode, WriteMode};
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn replay(strategy: &AsyncProcessingStrategy, content: &str) -> String {
        let file = create_temp_csv(content);
        let mut output = Vec::new();
        strategy.process(file.path(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_async_strategy_transfer_scenario() {
        let strategy =
            AsyncProcessingStrategy::new(HandlerConfig::default(), BatchConfig::default());
        let output = replay(
            &strategy,
            "entry,function,args\n\
             seed,A,100\n\
             seed,B,50\n\
             invoke,invoke,A,B,10\n",
        );
        assert_eq!(output, "key,value\nA,90\nB,62\n");
    }

    #[rstest]
    #[case::one_step_per_batch(1)]
    #[case::uneven_batches(2)]
    #[case::single_batch(1000)]
    fn test_async_strategy_preserves_order_across_batches(#[case] batch_size: usize) {
        let strategy = AsyncProcessingStrategy::new(
            HandlerConfig::default(),
            BatchConfig::new(batch_size, 2),
        );
        // Each step depends on the previous one
        let output = replay(
            &strategy,
            "entry,function,args\n\
             seed,A,100\n\
             seed,B,0\n\
             invoke,invoke,A,B,10\n\
             invoke,invoke,B,A,12\n\
             run,invoke,A,B,50\n\
             run,delete,A\n\
             seed,A,7\n",
        );
        assert_eq!(output, "key,value\nA,7\nB,52\n");
    }

    #[test]
    fn test_async_strategy_honours_handler_config() {
        let strategy = AsyncProcessingStrategy::new(
            HandlerConfig::new(DecodeMode::Lenient, WriteMode::Direct),
            BatchConfig::default(),
        );
        let output = replay(
            &strategy,
            "entry,function,args\n\
             seed,A,5\n\
             seed,B,1\n\
             invoke,invoke,A,B,x\n",
        );
        assert_eq!(output, "key,value\nA,5\nB,3\n");
    }

    #[test]
    fn test_async_strategy_handles_missing_file() {
        let strategy =
            AsyncProcessingStrategy::new(HandlerConfig::default(), BatchConfig::default());
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[rstest]
    #[case::zero_batch_size(0, 4, 1000, 4)]
    #[case::zero_worker_threads(10, 0, 10, num_cpus::get())]
    #[case::both_set(10, 4, 10, 4)]
    fn test_batch_config_zero_values_fall_back(
        #[case] batch_size: usize,
        #[case] worker_threads: usize,
        #[case] expected_batch_size: usize,
        #[case] expected_worker_threads: usize,
    ) {
        let config = BatchConfig::new(batch_size, worker_threads);
        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.worker_threads, expected_worker_threads);
    }
}
