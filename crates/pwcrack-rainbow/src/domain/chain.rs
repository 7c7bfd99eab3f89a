//! Chain operations implementation
//!
//! This module provides the chain entry structure and functions for
//! chain generation and regeneration in rainbow table operations.

use crate::domain::hash::{Digest, hash_plaintext};
use crate::domain::reduction::{CandidateGenerator, ReductionFamily};
use serde::{Deserialize, Serialize};

/// Chain entry structure
///
/// `end` is `steps` rounds of hash → reduce away from `start`; both hold
/// exactly `length` symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Starting plaintext of the chain
    pub start: String,
    /// Ending plaintext of the chain (lookup key)
    pub end: String,
    /// Plaintext length in symbols
    pub length: usize,
}

impl ChainEntry {
    /// Create a new chain entry
    pub fn new(start: impl Into<String>, end: impl Into<String>, length: usize) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            length,
        }
    }

    /// Check that start and end both hold `length` symbols
    pub fn is_well_formed(&self) -> bool {
        self.start.chars().count() == self.length && self.end.chars().count() == self.length
    }
}

/// Compute a single chain
///
/// Starting from `start`, repeat hash → reduce `steps` times and return the
/// resulting entry. The reduction length is the symbol count of `start`.
pub fn compute_chain<G: CandidateGenerator>(
    start: &str,
    steps: u32,
    reduction: &ReductionFamily<G>,
) -> ChainEntry {
    let length = start.chars().count();
    let mut current = start.to_owned();

    for step in 0..steps {
        let digest = hash_plaintext(&current);
        current = reduction.reduce(&digest, step, length);
    }

    ChainEntry {
        start: start.to_owned(),
        end: current,
        length,
    }
}

/// Regenerate a chain from its start and look for `target`
///
/// Walks positions 0..steps, hashing the plaintext at each position. Returns
/// the plaintext whose digest equals `target`, or `None` if the chain never
/// produces it. This is the only check that rules out false alarms from
/// merging chains.
pub fn regenerate_chain<G: CandidateGenerator>(
    start: &str,
    target: &Digest,
    steps: u32,
    reduction: &ReductionFamily<G>,
) -> Option<String> {
    let length = start.chars().count();
    let mut plaintext = start.to_owned();

    for step in 0..steps {
        let digest = hash_plaintext(&plaintext);
        if digest == *target {
            return Some(plaintext);
        }
        plaintext = reduction.reduce(&digest, step, length);
    }

    None
}

/// Enumerate all plaintexts in a chain
///
/// Returns a vector containing `start` and all subsequent plaintexts
/// (`steps + 1` elements total, the last being the chain end).
pub fn enumerate_chain<G: CandidateGenerator>(
    start: &str,
    steps: u32,
    reduction: &ReductionFamily<G>,
) -> Vec<String> {
    let length = start.chars().count();
    let mut plaintexts = Vec::with_capacity(steps as usize + 1);
    let mut current = start.to_owned();
    plaintexts.push(current.clone());

    for step in 0..steps {
        let digest = hash_plaintext(&current);
        current = reduction.reduce(&digest, step, length);
        plaintexts.push(current.clone());
    }

    plaintexts
}
