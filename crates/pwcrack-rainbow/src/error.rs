//! Crate-level error type

use crate::config::ConfigError;
use crate::domain::hash::DigestError;
use crate::infra::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RainbowError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Digest(#[from] DigestError),

    #[error("failed to start lookup workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
