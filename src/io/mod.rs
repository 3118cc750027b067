//! I/O module
//!
//! Handles invocation script parsing and ledger dump output.
//!
//! # Components
//!
//! - `script_format` - Row conversion and ledger dump serialization
//! - `sync_reader` - Synchronous script reader with iterator interface
//! - `async_reader` - Asynchronous script reader with batch reading interface

pub mod async_reader;
pub mod script_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use script_format::{parse_script_fields, write_ledger_csv};
pub use sync_reader::SyncReader;
