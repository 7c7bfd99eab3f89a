//! Rainbow table configuration
//!
//! `RainbowConfig` is built once at startup and handed by reference to the
//! builder, cracker, coordinator and store factory. Nothing reads settings
//! from global state.

use crate::constants::{
    BINARY_FILE_EXTENSION, DEFAULT_BATCH_FRACTION, DEFAULT_DATA_PATH, DEFAULT_STEPS,
    JSON_FILE_EXTENSION,
};
use crate::domain::alphabet::{Alphabet, AlphabetError};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("steps must be at least 1")]
    ZeroSteps,
    #[error("batch fraction must be in (0, 1], got {0}")]
    InvalidBatchFraction(f64),
    #[error("invalid alphabet: {0}")]
    Alphabet(#[from] AlphabetError),
    #[error("unknown store backend {0:?} (expected \"json\" or \"binary\")")]
    UnknownBackend(String),
}

/// Persistence technology for the chain store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    /// Whole-table JSON document
    #[default]
    Json,
    /// Header + length-prefixed records, read through a memory map
    Binary,
}

impl StoreBackend {
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Json => JSON_FILE_EXTENSION,
            Self::Binary => BINARY_FILE_EXTENSION,
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Binary => f.write_str("binary"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "binary" | "bin" | "pwrt" => Ok(Self::Binary),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Immutable rainbow table configuration
#[derive(Clone, Debug)]
pub struct RainbowConfig {
    /// Plaintext alphabet
    pub alphabet: Alphabet,
    /// Global chain depth; every stored chain must share it
    pub steps: u32,
    /// Directory holding the persisted table
    pub data_path: PathBuf,
    /// Persistence backend
    pub backend: StoreBackend,
    /// Share of the requested rows written per build batch
    pub batch_fraction: f64,
}

impl Default for RainbowConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            steps: DEFAULT_STEPS,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            backend: StoreBackend::default(),
            batch_fraction: DEFAULT_BATCH_FRACTION,
        }
    }
}

impl RainbowConfig {
    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_data_path(mut self, data_path: impl Into<PathBuf>) -> Self {
        self.data_path = data_path.into();
        self
    }

    pub fn with_backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_batch_fraction(mut self, batch_fraction: f64) -> Self {
        self.batch_fraction = batch_fraction;
        self
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if steps is zero or the batch fraction is outside (0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 {
            return Err(ConfigError::ZeroSteps);
        }
        if !(self.batch_fraction > 0.0 && self.batch_fraction <= 1.0) {
            return Err(ConfigError::InvalidBatchFraction(self.batch_fraction));
        }
        Ok(())
    }

    /// Rows per persisted batch when building `count` chains
    pub fn batch_size(&self, count: usize) -> usize {
        ((count as f64 * self.batch_fraction).ceil() as usize).clamp(1, count.max(1))
    }

    /// Path of the persisted table for the configured backend
    pub fn table_path(&self) -> PathBuf {
        crate::infra::table_io::get_table_path(&self.data_path, self.backend)
    }
}
