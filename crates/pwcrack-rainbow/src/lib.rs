//! pwcrack-rainbow - Rainbow tables for SHA-512 password digests
//!
//! This crate provides functionality to:
//! - Build chains of fixed-length plaintexts over a configurable alphabet
//! - Persist chains in an in-memory index or a JSON / binary table file
//! - Recover a plaintext from its SHA-512 digest, one length or all of them at once

pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;

// Re-export commonly used types
pub use app::coordinator::SearchCoordinator;
pub use app::cracker::Cracker;
pub use app::generator::ChainBuilder;
pub use config::{ConfigError, RainbowConfig, StoreBackend};
pub use constants::*;
pub use domain::alphabet::{Alphabet, AlphabetError};
pub use domain::chain::{ChainEntry, compute_chain, regenerate_chain};
pub use domain::hash::{Digest, DigestError, hash_plaintext};
pub use domain::reduction::{CandidateGenerator, ReductionFamily, Sha512SplitMix};
pub use error::RainbowError;
pub use infra::file_store::{FileChainStore, FileStoreFactory, MismatchPolicy};
pub use infra::store::{ChainIndex, ChainStore, StoreError, StoreFactory};
