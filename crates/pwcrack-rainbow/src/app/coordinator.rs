//! Multi-length lookup
//!
//! Fans a digest out to one worker per stored plaintext length. Every worker
//! opens its own store handle through the factory.

use crate::app::cracker::Cracker;
use crate::config::RainbowConfig;
use crate::domain::hash::Digest;
use crate::domain::reduction::{CandidateGenerator, ReductionFamily, Sha512SplitMix};
use crate::error::RainbowError;
use crate::infra::store::{ChainStore, StoreError, StoreFactory};
use rayon::prelude::*;
use std::thread;

pub struct SearchCoordinator<'a, F, G = Sha512SplitMix> {
    factory: &'a F,
    reduction: ReductionFamily<G>,
    steps: u32,
}

impl<'a, F: StoreFactory> SearchCoordinator<'a, F, Sha512SplitMix> {
    pub fn new(config: &RainbowConfig, factory: &'a F) -> Self {
        Self::with_reduction(factory, ReductionFamily::new(config.alphabet.clone()), config.steps)
    }
}

impl<'a, F, G> SearchCoordinator<'a, F, G>
where
    F: StoreFactory,
    G: CandidateGenerator,
{
    pub fn with_reduction(factory: &'a F, reduction: ReductionFamily<G>, steps: u32) -> Self {
        Self {
            factory,
            reduction,
            steps,
        }
    }

    /// Look up `target` under a single plaintext length
    pub fn crack_length(&self, target: &Digest, length: usize) -> Result<Option<String>, StoreError> {
        let store = self.factory.open_store()?;
        Cracker::new(&store, &self.reduction, self.steps).crack(target, length)
    }

    /// Look up `target` under every length present in the store
    ///
    /// Results are examined in ascending length order: the first plaintext
    /// wins, otherwise the first worker error is returned, otherwise `None`.
    pub fn crack_any_length(&self, target: &Digest) -> Result<Option<String>, RainbowError> {
        let lengths = self.factory.open_store()?.get_available_lengths()?;
        if lengths.is_empty() {
            tracing::info!("Store holds no chains");
            return Ok(None);
        }

        let cores = thread::available_parallelism().map_or(1, |n| n.get());
        let workers = lengths.len().min(cores);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;

        tracing::info!(?lengths, workers, "Searching all lengths");

        let results: Vec<Result<Option<String>, StoreError>> = pool.install(|| {
            lengths
                .par_iter()
                .map(|&length| self.crack_length(target, length))
                .collect()
        });

        let mut first_error = None;
        for (length, result) in lengths.iter().zip(results) {
            match result {
                Ok(Some(plaintext)) => {
                    tracing::info!(length, "Plaintext recovered");
                    return Ok(Some(plaintext));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(length, error = %e, "Lookup worker failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(None),
        }
    }
}
