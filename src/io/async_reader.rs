//! Asynchronous script reader with batch interface
//!
//! Reads `ScriptStep`s from any `futures::io::AsyncRead` in fixed-size batches,
//! so the next batch can be parsed while the previous one is replayed.
//!
//! # Architecture
//!
//! ```text
//! AsyncRead → csv_async::AsyncReader → AsyncReader → Vec<ScriptStep>
//!                                          ↓
//!                                  script_format module
//!                                  (parse_script_fields)
//! ```

use crate::io::script_format::parse_script_fields;
use crate::types::ScriptStep;
use csv_async::{AsyncReaderBuilder, StringRecord, Trim};
use futures::io::AsyncRead;
use tracing::warn;

/// Asynchronous script reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncReader<R>,
    record: StringRecord,
    finished: bool,
}

impl<R: AsyncRead + Unpin + Send> AsyncReader<R> {
    /// Create a new AsyncReader
    ///
    /// Uses the same row conventions as the synchronous reader: a header row,
    /// trimmed fields, flexible field counts and `#` comments.
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .create_reader(reader);

        Self {
            csv_reader,
            record: StringRecord::new(),
            finished: false,
        }
    }

    /// Read up to `batch_size` script steps
    ///
    /// Malformed rows are logged and skipped, so a batch may hold fewer steps
    /// than rows consumed. Returns an empty vector once the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<ScriptStep> {
        let mut batch = Vec::with_capacity(batch_size);

        while !self.finished && batch.len() < batch_size {
            match self.csv_reader.read_record(&mut self.record).await {
                Ok(true) => {
                    let line = self.record.position().map_or(0, |pos| pos.line());
                    match parse_script_fields(self.record.iter()) {
                        Ok(step) => batch.push(step),
                        Err(e) => warn!(line, error = %e, "skipping script row"),
                    }
                }
                Ok(false) => self.finished = true,
                Err(e) => {
                    if e.is_io_error() {
                        self.finished = true;
                    }
                    let line = e.position().map_or(0, |pos| pos.line());
                    warn!(line, error = %e, "CSV parse error");
                }
            }
        }

        batch
    }
}
