//! Ledger handler replay CLI
//!
//! Replays an invocation script against an in-process ledger and writes the
//! final ledger contents to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- script.csv > ledger.csv
//! cargo run -- --strategy async --batch-size 500 script.csv > ledger.csv
//! cargo run -- --decoding lenient --writes direct script.csv > ledger.csv
//! RUST_LOG=debug cargo run -- script.csv
//! ```
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the CSV
//! dump.
//!
//! # Exit Codes
//!
//! - 0: Success (individual invocations may still have failed)
//! - 1: Error (file not found, file not readable, output error, etc.)

use ledger_handler::cli;
use ledger_handler::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();
    if let Err(e) = cli::init_tracing(&args.log_level) {
        eprintln!("Warning: {}", e);
    }

    let batch_config = match args.strategy {
        cli::StrategyType::Async => Some(args.to_batch_config()),
        cli::StrategyType::Sync => None,
    };
    let strategy =
        strategy::create_strategy(args.strategy, args.to_handler_config(), batch_config);

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
