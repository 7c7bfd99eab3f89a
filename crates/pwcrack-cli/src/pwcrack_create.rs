//! Rainbow table creation CLI
//!
//! Usage: pwcrack_create <rows> <length> [options]
//!
//! Example: pwcrack_create 100000 6 --steps 1000 --backend binary

mod settings;

use anyhow::Context;
use clap::Parser;
use pwcrack_rainbow::{ChainBuilder, FileChainStore, MismatchPolicy};
use settings::{TableSettings, init_tracing};
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "pwcrack_create")]
#[command(about = "Build SHA-512 rainbow table chains for one plaintext length")]
struct Args {
    /// Number of chains to build
    rows: usize,

    /// Plaintext length in symbols
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    length: u32,

    /// Replace a table built with other steps or alphabet instead of failing
    #[arg(long)]
    discard_mismatched: bool,

    #[command(flatten)]
    table: TableSettings,
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = Args::parse();
    let config = args.table.to_config().context("invalid table settings")?;
    let length = args.length as usize;

    let policy = if args.discard_mismatched {
        MismatchPolicy::Discard
    } else {
        MismatchPolicy::Abort
    };

    let mut store = match FileChainStore::open_with_config(&config, policy) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening table {}: {}", config.table_path().display(), e);
            if e.is_mismatch() {
                eprintln!("Re-run with --discard-mismatched to rebuild it with the current settings.");
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    println!(
        "Building {} chains of length {} ({} steps, {} symbols)...",
        args.rows,
        length,
        config.steps,
        config.alphabet.len()
    );

    let start = Instant::now();
    let builder = ChainBuilder::new(&config);
    let result = builder.build_with_progress(
        &mut store,
        args.rows,
        length,
        &mut rand::thread_rng(),
        |built, total| {
            let progress = if total > 0 {
                (built as f64 / total as f64) * 100.0
            } else {
                100.0
            };
            print!("\r[Build] Progress: {:.2}% ({}/{})", progress, built, total);
            let _ = io::stdout().flush();
        },
    );
    println!();

    match result {
        Ok(chains) => {
            println!(
                "Built {} chains in {:.2} seconds",
                chains.len(),
                start.elapsed().as_secs_f64()
            );
            println!(
                "Table {} now holds {} chains",
                store.path().display(),
                store.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error writing table: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
