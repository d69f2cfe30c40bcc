//! Settlement Tracker CLI
//!
//! Keeps settlement records in a CSV file and prints them, with their
//! period-over-period changes, as CSV.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- settlements.csv add 2024-01-01 2024-01-31 125000 42
//! cargo run -- settlements.csv list
//! cargo run -- settlements.csv compare 1 2
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use settlement_tracker::cli::{self, Config};
use settlement_tracker::{CsvRepository, RecordStore, Result};
use std::env;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_args(&args)?;

    let mut store = RecordStore::open(CsvRepository::new(&config.store_path))?;

    let stdout = io::stdout();
    let handle = stdout.lock();
    cli::execute(&mut store, &config.command, handle)
}
