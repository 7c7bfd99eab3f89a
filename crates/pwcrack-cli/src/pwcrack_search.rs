//! Plaintext recovery CLI
//!
//! Usage: pwcrack_search <digest> [--length <N>] [options]
//!
//! Prints the recovered plaintext, or "not found" when no stored chain
//! covers the digest. Without `--length` every stored length is searched
//! in parallel.

mod settings;

use anyhow::Context;
use clap::Parser;
use pwcrack_rainbow::{
    ChainStore, Cracker, Digest, FileStoreFactory, RainbowError, ReductionFamily,
    SearchCoordinator, StoreFactory,
};
use settings::{TableSettings, init_tracing};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "pwcrack_search")]
#[command(about = "Recover a plaintext from its SHA-512 digest")]
struct Args {
    /// SHA-512 digest, 128 hex characters
    digest: Digest,

    /// Only search plaintexts of this length
    #[arg(long, short)]
    length: Option<usize>,

    #[command(flatten)]
    table: TableSettings,
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = Args::parse();
    let config = args.table.to_config().context("invalid table settings")?;
    let factory = FileStoreFactory::from_config(&config);

    let start = Instant::now();

    let result: Result<Option<String>, RainbowError> = match args.length {
        Some(length) => {
            let store = match factory.open_store() {
                Ok(store) => store,
                Err(e) => {
                    eprintln!("Error opening table {}: {}", factory.path().display(), e);
                    return Ok(ExitCode::FAILURE);
                }
            };
            let lengths = store.get_available_lengths()?;
            if !lengths.contains(&length) {
                tracing::info!(length, ?lengths, "Length not present in table");
                Ok(None)
            } else {
                let reduction = ReductionFamily::new(config.alphabet.clone());
                Cracker::new(&store, &reduction, config.steps)
                    .crack(&args.digest, length)
                    .map_err(Into::into)
            }
        }
        None => SearchCoordinator::new(&config, &factory).crack_any_length(&args.digest),
    };

    match result {
        Ok(Some(plaintext)) => {
            println!("{}", plaintext);
        }
        Ok(None) => {
            println!("not found");
        }
        Err(e) => {
            eprintln!("Error searching table {}: {}", factory.path().display(), e);
            return Ok(ExitCode::FAILURE);
        }
    }

    tracing::info!(elapsed = ?start.elapsed(), "Search finished");
    Ok(ExitCode::SUCCESS)
}
