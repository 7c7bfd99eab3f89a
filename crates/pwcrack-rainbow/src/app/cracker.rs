//! Single-length lookup workflow
//!
//! For every assumed position of the target inside a chain, the remaining
//! reductions are replayed to an endpoint, the store is queried for starts
//! ending there, and each candidate chain is regenerated to rule out false
//! alarms.

use crate::domain::chain::regenerate_chain;
use crate::domain::hash::{Digest, hash_plaintext};
use crate::domain::reduction::{CandidateGenerator, ReductionFamily, Sha512SplitMix};
use crate::infra::store::{ChainStore, StoreError};
use rustc_hash::FxHashSet;

/// Looks up digests of one plaintext length in a chain store
pub struct Cracker<'a, S: ?Sized, G = Sha512SplitMix> {
    store: &'a S,
    reduction: &'a ReductionFamily<G>,
    steps: u32,
}

impl<'a, S, G> Cracker<'a, S, G>
where
    S: ChainStore + ?Sized,
    G: CandidateGenerator,
{
    pub fn new(store: &'a S, reduction: &'a ReductionFamily<G>, steps: u32) -> Self {
        Self {
            store,
            reduction,
            steps,
        }
    }

    /// Endpoint reached when the target digest sits at `step` of a chain
    pub fn endpoint_from(&self, target: &Digest, step: u32, length: usize) -> String {
        let mut candidate = self.reduction.reduce(target, step, length);
        for k in step + 1..self.steps {
            candidate = self.reduction.reduce(&hash_plaintext(&candidate), k, length);
        }
        candidate
    }

    /// Recover a plaintext of `length` symbols hashing to `target`
    ///
    /// Positions are tried from the chain tail backwards, so the cheapest
    /// endpoint computations come first. The first verified plaintext is
    /// returned.
    ///
    /// # Arguments
    /// * `target` - The digest to invert
    /// * `length` - Plaintext length; a length absent from the store finds nothing
    ///
    /// # Returns
    /// `Ok(None)` when no chain covers the target, or the first store error
    pub fn crack(&self, target: &Digest, length: usize) -> Result<Option<String>, StoreError> {
        // A start that failed verification fails for every position.
        let mut rejected: FxHashSet<String> = FxHashSet::default();

        for step in (0..self.steps).rev() {
            let end = self.endpoint_from(target, step, length);
            let starts = self.store.get_start_candidates(&end, length)?;

            for start in starts {
                if rejected.contains(&start) {
                    continue;
                }
                if let Some(plaintext) = regenerate_chain(&start, target, self.steps, self.reduction) {
                    tracing::debug!(length, step, %start, "Verified chain hit");
                    return Ok(Some(plaintext));
                }
                tracing::debug!(length, step, %start, "False alarm");
                rejected.insert(start);
            }
        }

        Ok(None)
    }
}
