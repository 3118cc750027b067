//! Invocation script and ledger dump formats
//!
//! This module centralizes all CSV format concerns, providing:
//! - Conversion from script rows to `ScriptStep`s
//! - Ledger dump serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Script format
//!
//! A header row followed by one step per row, `entry,function,args...`:
//!
//! ```text
//! entry,function,args
//! seed,A,100
//! init,,id1,name1,2024-01-01,detail1,x,x,x,x
//! invoke,invoke,A,B,10
//! run,delete,A
//! query,query,B
//! ```
//!
//! `seed` rows carry a key and a value and bypass the handler. For every other
//! entry the second column is the function name and the remaining columns are
//! passed through as positional arguments.

use crate::types::{EntryKind, InvocationRecord, ScriptStep};
use csv::WriterBuilder;
use serde::Serialize;
use std::borrow::Cow;
use std::io::Write;

/// Header written before the ledger dump
pub const LEDGER_HEADER: [&str; 2] = ["key", "value"];

/// One row of the ledger dump
#[derive(Debug, Serialize)]
struct LedgerRow<'a> {
    key: &'a str,
    value: Cow<'a, str>,
}

/// Convert the fields of one script row to a `ScriptStep`
///
/// Entry names are matched case-insensitively; function names and arguments
/// are passed through as given.
///
/// # Returns
///
/// Result containing either:
/// - Ok(ScriptStep) - Successfully converted row
/// - Err(String) - Error message describing the conversion failure
pub fn parse_script_fields<'a, I>(fields: I) -> Result<ScriptStep, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut fields = fields.into_iter();

    let entry_name = fields
        .next()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "Missing entry point".to_string())?;

    if entry_name.eq_ignore_ascii_case("seed") {
        let rest: Vec<&str> = fields.collect();
        return match rest.as_slice() {
            [key, value] => Ok(ScriptStep::Seed {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!(
                "seed expects a key and a value, got {} field(s)",
                rest.len()
            )),
        };
    }

    let entry = EntryKind::from_name(entry_name)
        .ok_or_else(|| format!("Invalid entry point: '{}'", entry_name))?;
    let function = fields.next().unwrap_or_default().to_string();
    let args = fields.map(str::to_string).collect();

    Ok(ScriptStep::Call(InvocationRecord {
        entry,
        function,
        args,
    }))
}

/// Write ledger entries in CSV format
///
/// Writes a `key,value` header followed by one row per entry, in the order
/// given. Values are rendered as UTF-8, replacing invalid sequences.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_ledger_csv(entries: &[(String, Vec<u8>)], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);

    writer
        .write_record(LEDGER_HEADER)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for (key, value) in entries {
        writer
            .serialize(LedgerRow {
                key,
                value: String::from_utf8_lossy(value),
            })
            .map_err(|e| format!("Failed to write ledger entry '{}': {}", key, e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
