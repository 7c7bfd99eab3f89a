//! Table generation workflow
//!
//! This module builds chains of one plaintext length and persists them to a
//! chain store in batches.

use crate::config::RainbowConfig;
use crate::domain::chain::{ChainEntry, compute_chain};
use crate::domain::reduction::{CandidateGenerator, ReductionFamily, Sha512SplitMix};
use crate::infra::store::{ChainStore, StoreError};
use rand::Rng;
use rayon::prelude::*;

/// Builds chains and writes them to a store
#[derive(Clone, Debug)]
pub struct ChainBuilder<G = Sha512SplitMix> {
    reduction: ReductionFamily<G>,
    config: RainbowConfig,
}

impl ChainBuilder<Sha512SplitMix> {
    pub fn new(config: &RainbowConfig) -> Self {
        Self::with_reduction(config, ReductionFamily::new(config.alphabet.clone()))
    }
}

impl<G: CandidateGenerator> ChainBuilder<G> {
    pub fn with_reduction(config: &RainbowConfig, reduction: ReductionFamily<G>) -> Self {
        Self {
            reduction,
            config: config.clone(),
        }
    }

    pub fn reduction(&self) -> &ReductionFamily<G> {
        &self.reduction
    }

    pub fn steps(&self) -> u32 {
        self.config.steps
    }

    /// Compute the chains for the given starts in parallel
    pub fn generate_chains(&self, starts: &[String]) -> Vec<ChainEntry> {
        starts
            .par_iter()
            .map(|start| compute_chain(start, self.config.steps, &self.reduction))
            .collect()
    }

    /// Build `count` chains of `length` symbols from random starts
    pub fn build<S>(
        &self,
        store: &mut S,
        count: usize,
        length: usize,
    ) -> Result<Vec<ChainEntry>, StoreError>
    where
        S: ChainStore + ?Sized,
    {
        self.build_with_progress(store, count, length, &mut rand::thread_rng(), |_, _| {})
    }

    /// Build with a caller-supplied random source for the starts
    pub fn build_with_rng<S, R>(
        &self,
        store: &mut S,
        count: usize,
        length: usize,
        rng: &mut R,
    ) -> Result<Vec<ChainEntry>, StoreError>
    where
        S: ChainStore + ?Sized,
        R: Rng + ?Sized,
    {
        self.build_with_progress(store, count, length, rng, |_, _| {})
    }

    /// Build with a progress callback invoked after each persisted batch
    ///
    /// A store failure aborts the remaining batches; batches already written
    /// stay valid because inserts are idempotent on the start.
    pub fn build_with_progress<S, R, F>(
        &self,
        store: &mut S,
        count: usize,
        length: usize,
        rng: &mut R,
        mut on_progress: F,
    ) -> Result<Vec<ChainEntry>, StoreError>
    where
        S: ChainStore + ?Sized,
        R: Rng + ?Sized,
        F: FnMut(usize, usize), // (built, total)
    {
        let batch_size = self.config.batch_size(count);
        let alphabet = self.reduction.alphabet();
        let mut chains = Vec::with_capacity(count);

        while chains.len() < count {
            let batch_len = batch_size.min(count - chains.len());
            let starts: Vec<String> = (0..batch_len)
                .map(|_| alphabet.random_plaintext(rng, length))
                .collect();

            let batch = self.generate_chains(&starts);
            let inserted = store.add_chains(&batch)?;

            tracing::info!(
                length,
                batch = batch.len(),
                inserted,
                built = chains.len() + batch.len(),
                total = count,
                "Persisted chain batch"
            );

            chains.extend(batch);
            on_progress(chains.len(), count);
        }

        Ok(chains)
    }
}
