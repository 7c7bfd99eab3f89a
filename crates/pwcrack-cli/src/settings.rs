//! Table settings shared by both binaries
//!
//! Every flag can also come from a `PWCRACK_*` environment variable.

use clap::Args;
use pwcrack_rainbow::constants::{
    DEFAULT_ALPHABET, DEFAULT_BATCH_FRACTION, DEFAULT_DATA_PATH, DEFAULT_STEPS,
};
use pwcrack_rainbow::{Alphabet, ConfigError, RainbowConfig, StoreBackend};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TableSettings {
    /// Directory holding the table file
    #[arg(long, env = "PWCRACK_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Hash/reduce rounds per chain
    #[arg(long, env = "PWCRACK_STEPS", default_value_t = DEFAULT_STEPS)]
    pub steps: u32,

    /// Plaintext symbols, in reduction order
    #[arg(long, env = "PWCRACK_ALPHABET", default_value = DEFAULT_ALPHABET)]
    pub alphabet: String,

    /// Table file format: json or binary
    #[arg(long, env = "PWCRACK_BACKEND", default_value_t = StoreBackend::Json)]
    pub backend: StoreBackend,

    /// Share of the requested rows written per batch
    #[arg(long, env = "PWCRACK_BATCH_FRACTION", default_value_t = DEFAULT_BATCH_FRACTION)]
    pub batch_fraction: f64,
}

impl TableSettings {
    pub fn to_config(&self) -> Result<RainbowConfig, ConfigError> {
        let config = RainbowConfig::default()
            .with_alphabet(Alphabet::new(&self.alphabet)?)
            .with_steps(self.steps)
            .with_data_path(&self.data_path)
            .with_backend(self.backend)
            .with_batch_fraction(self.batch_fraction);
        config.validate()?;
        Ok(config)
    }
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
