//! Synchronous replay strategy
//!
//! Streams the script through a `SyncReader` and replays each step against a
//! single-threaded `MemoryLedger`, then dumps the ledger.
//!
//! # Design
//!
//! The strategy only orchestrates:
//! - Script parsing is done by `SyncReader` (iterator interface)
//! - Invocation semantics live in `LedgerHandler`
//! - Output formatting is done by `script_format::write_ledger_csv`

use crate::core::{BatchSummary, LedgerHandler, MemoryLedger};
use crate::io::script_format::write_ledger_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::HandlerConfig;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// Single-threaded replay strategy
///
/// ```no_run
/// use ledger_handler::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use ledger_handler::types::HandlerConfig;
/// use std::path::Path;
///
/// let strategy = SyncProcessingStrategy::new(HandlerConfig::default());
/// strategy
///     .process(Path::new("script.csv"), &mut std::io::stdout())
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncProcessingStrategy {
    handler: LedgerHandler,
}

impl SyncProcessingStrategy {
    /// Create a strategy whose handler uses `config`
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            handler: LedgerHandler::new(config),
        }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), String> {
        let mut ledger = MemoryLedger::new();
        let reader = SyncReader::new(input_path)?;
        let mut summary = BatchSummary::default();

        for result in reader {
            let step = match result {
                Ok(step) => step,
                Err(e) => {
                    warn!(error = %e, "skipping script row");
                    continue;
                }
            };

            match self.handler.replay(&mut ledger, &step) {
                Ok(payload) => {
                    if let Some(bytes) = payload {
                        debug!(len = bytes.len(), "invocation returned payload");
                    }
                    summary.applied += 1;
                }
                Err(e) => {
                    warn!(error = %e, ?step, "invocation failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            applied = summary.applied,
            failed = summary.failed,
            entries = ledger.len(),
            "replay finished"
        );

        write_ledger_csv(&ledger.snapshot(), output)
    }
}
