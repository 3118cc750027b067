//! Synchronous script reader with iterator interface
//!
//! Streams `ScriptStep`s from a CSV invocation script, one row at a time.
//! Row conversion is delegated to the `script_format` module.
//!
//! ```no_run
//! use ledger_handler::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("script.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(step) => println!("Replaying: {:?}", step),
//!         Err(e) => eprintln!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Failing to open the file is returned from `new()`
//! - Malformed rows are yielded as `Err` with the line number; iteration continues
//! - An I/O error while reading ends the iteration after it is yielded

use crate::io::script_format::parse_script_fields;
use crate::types::ScriptStep;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Synchronous script reader
///
/// Reuses one `StringRecord` buffer for every row, so memory use does not
/// grow with the script length.
#[derive(Debug)]
pub struct SyncReader<R = File> {
    reader: csv::Reader<R>,
    record: StringRecord,
    finished: bool,
}

impl SyncReader<File> {
    /// Open a script file
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if the file opened successfully
    /// * `Err(String)` if the file could not be opened
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> SyncReader<R> {
    /// Read a script from any byte source
    ///
    /// The first row is treated as a header. Fields are trimmed, rows may have
    /// any number of fields, and lines starting with `#` are skipped.
    pub fn from_reader(source: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .buffer_capacity(8 * 1024)
            .from_reader(source);

        Self {
            reader,
            record: StringRecord::new(),
            finished: false,
        }
    }
}

impl<R: Read> Iterator for SyncReader<R> {
    type Item = Result<ScriptStep, String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let line = self.record.position().map_or(0, |pos| pos.line());
                Some(
                    parse_script_fields(self.record.iter())
                        .map_err(|e| format!("Line {}: {}", line, e)),
                )
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Err(e) => {
                // The csv reader cannot make progress past a failed read
                if e.is_io_error() {
                    self.finished = true;
                }
                let line = e.position().map_or(0, |pos| pos.line());
                Some(Err(format!("Line {}: CSV parse error: {}", line, e)))
            }
        }
    }
}
