//! Reduction function family
//!
//! R_step maps a digest back into the plaintext space. Chain building and
//! cracking must reduce bit-identically, so everything here is a pure function
//! of (digest, step, length, alphabet).
//!
//! The family is split in two so the candidate generator can be swapped and
//! tested apart from hashing:
//! 1. `derive_seed`: digest + step → 64-bit seed
//! 2. `draw`: seed → `length` symbols from the alphabet

use crate::constants::DIGEST_HEX_LEN;
use crate::domain::alphabet::Alphabet;
use crate::domain::hash::Digest;
use sha2::{Digest as _, Sha512};

/// Deterministic candidate generator used by the reduction family
pub trait CandidateGenerator: Send + Sync {
    /// Derive the seed for reduction `step` of `digest`
    fn derive_seed(&self, digest: &Digest, step: u32) -> u64;

    /// Draw exactly `length` symbols from `alphabet` out of the sequence seeded by `seed`
    fn draw(&self, seed: u64, alphabet: &Alphabet, length: usize) -> String;
}

/// Default generator: SHA-512 seed derivation + SplitMix64 symbol draw
///
/// Seed = first 8 bytes (little-endian) of SHA-512(hex(digest) || decimal(step)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sha512SplitMix;

impl CandidateGenerator for Sha512SplitMix {
    fn derive_seed(&self, digest: &Digest, step: u32) -> u64 {
        let mut hex_buf = [0u8; DIGEST_HEX_LEN];
        digest.encode_hex(&mut hex_buf);

        let mut hasher = Sha512::new();
        hasher.update(hex_buf);
        hasher.update(step.to_string().as_bytes());
        let seed_hash = hasher.finalize();

        let mut seed = [0u8; 8];
        seed.copy_from_slice(&seed_hash[..8]);
        u64::from_le_bytes(seed)
    }

    fn draw(&self, seed: u64, alphabet: &Alphabet, length: usize) -> String {
        let mut rng = SplitMix64::new(seed);
        let symbols = alphabet.len() as u128;

        (0..length)
            .map(|_| {
                // Multiply-high maps the 64-bit output onto 0..symbols
                let index = ((rng.next_u64() as u128 * symbols) >> 64) as usize;
                alphabet.symbol(index)
            })
            .collect()
    }
}

/// SplitMix64 sequence
///
/// Same mixing constants as the classic SplitMix64 finalizer; every output
/// bit depends on every state bit.
#[derive(Clone, Debug)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }
}

/// Family of reduction functions R_0..R_{S-1} over one alphabet
#[derive(Clone, Debug)]
pub struct ReductionFamily<G = Sha512SplitMix> {
    alphabet: Alphabet,
    generator: G,
}

impl ReductionFamily<Sha512SplitMix> {
    pub fn new(alphabet: Alphabet) -> Self {
        Self::with_generator(alphabet, Sha512SplitMix)
    }
}

impl<G: CandidateGenerator> ReductionFamily<G> {
    pub fn with_generator(alphabet: Alphabet, generator: G) -> Self {
        Self {
            alphabet,
            generator,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Reduce a digest to a plaintext of `length` symbols
    ///
    /// The step index is mixed into the seed so that the same digest reduces
    /// differently at each chain position.
    #[inline]
    pub fn reduce(&self, digest: &Digest, step: u32, length: usize) -> String {
        let seed = self.generator.derive_seed(digest, step);
        self.generator.draw(seed, &self.alphabet, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::hash::hash_plaintext;

    fn lowercase() -> Alphabet {
        Alphabet::new("abcdefghijklmnopqrstuvwxyz").unwrap()
    }

    #[test]
    fn test_reduce_deterministic() {
        let family = ReductionFamily::new(lowercase());
        let digest = hash_plaintext("hello");

        let a = family.reduce(&digest, 7, 6);
        let b = family.reduce(&digest, 7, 6);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reduce_independent_instances_agree() {
        let digest = hash_plaintext("hello");
        let a = ReductionFamily::new(lowercase()).reduce(&digest, 3, 8);
        let b = ReductionFamily::new(lowercase()).reduce(&digest, 3, 8);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reduce_output_length_and_symbols() {
        let alphabet = lowercase();
        let family = ReductionFamily::new(alphabet.clone());
        let digest = hash_plaintext("hello");

        for length in [0usize, 1, 4, 12] {
            let reduced = family.reduce(&digest, 0, length);
            assert_eq!(reduced.chars().count(), length);
            assert!(alphabet.contains_all(&reduced));
        }
    }

    #[test]
    fn test_reduce_step_changes_output() {
        let family = ReductionFamily::new(lowercase());
        let digest = hash_plaintext("hello");

        let outputs: Vec<String> = (0..8).map(|step| family.reduce(&digest, step, 8)).collect();
        for i in 0..outputs.len() {
            for j in (i + 1)..outputs.len() {
                assert_ne!(outputs[i], outputs[j], "steps {} and {} collide", i, j);
            }
        }
    }

    #[test]
    fn test_reduce_digest_changes_output() {
        let family = ReductionFamily::new(lowercase());
        let a = family.reduce(&hash_plaintext("a"), 0, 8);
        let b = family.reduce(&hash_plaintext("b"), 0, 8);
        assert_ne!(a, b);
    }

    #[test]
    fn test_reduce_multibyte_alphabet() {
        let alphabet = Alphabet::new("äöüß").unwrap();
        let family = ReductionFamily::new(alphabet.clone());
        let reduced = family.reduce(&hash_plaintext("x"), 1, 5);
        assert_eq!(reduced.chars().count(), 5);
        assert!(alphabet.contains_all(&reduced));
    }

    #[test]
    fn test_seed_derivation_matches_hex_concatenation() {
        let digest = hash_plaintext("hello");
        let expected = {
            let h = hash_plaintext(&format!("{}{}", digest.to_hex(), 42));
            u64::from_le_bytes(h.as_bytes()[..8].try_into().unwrap())
        };
        assert_eq!(Sha512SplitMix.derive_seed(&digest, 42), expected);
    }

    #[test]
    fn test_splitmix_reference_values() {
        // Reference outputs of SplitMix64 seeded with 0
        let mut rng = SplitMix64::new(0);
        assert_eq!(rng.next_u64(), 0xe220a8397b1dcdaf);
        assert_eq!(rng.next_u64(), 0x6e789e6aa1b965f4);
    }

    /// Generator that ignores the seed; checks the family delegates both halves
    struct ConstantGenerator;

    impl CandidateGenerator for ConstantGenerator {
        fn derive_seed(&self, _digest: &Digest, step: u32) -> u64 {
            step as u64
        }

        fn draw(&self, seed: u64, alphabet: &Alphabet, length: usize) -> String {
            std::iter::repeat_n(alphabet.symbol(seed as usize % alphabet.len()), length).collect()
        }
    }

    #[test]
    fn test_custom_generator() {
        let family = ReductionFamily::with_generator(lowercase(), ConstantGenerator);
        let digest = hash_plaintext("ignored");
        assert_eq!(family.reduce(&digest, 0, 3), "aaa");
        assert_eq!(family.reduce(&digest, 2, 2), "cc");
    }
}
