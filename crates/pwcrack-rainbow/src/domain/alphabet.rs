//! Plaintext alphabet
//!
//! The ordered symbol set every plaintext (chain start, reduction output) is
//! drawn from. Symbol order matters: reduction picks symbols by index.

use rand::Rng;
use rustc_hash::FxHashSet;
use std::fmt;
use thiserror::Error;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// Alphabet construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlphabetError {
    #[error("alphabet must contain at least one symbol")]
    Empty,
    #[error("alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(char),
}

/// Ordered, duplicate-free set of plaintext symbols
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from the characters of `symbols`, keeping their order
    pub fn new(symbols: &str) -> Result<Self, AlphabetError> {
        let mut seen = FxHashSet::default();
        let mut ordered = Vec::with_capacity(symbols.len());

        for c in symbols.chars() {
            if !seen.insert(c) {
                return Err(AlphabetError::DuplicateSymbol(c));
            }
            ordered.push(c);
        }

        if ordered.is_empty() {
            return Err(AlphabetError::Empty);
        }

        Ok(Self { symbols: ordered })
    }

    /// Number of symbols (A)
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed alphabet
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn symbol(&self, index: usize) -> char {
        self.symbols[index]
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Check whether every character of `text` belongs to the alphabet
    pub fn contains_all(&self, text: &str) -> bool {
        text.chars().all(|c| self.symbols.contains(&c))
    }

    /// Draw a uniformly random plaintext of `length` symbols
    pub fn random_plaintext<R: Rng + ?Sized>(&self, rng: &mut R, length: usize) -> String {
        (0..length)
            .map(|_| self.symbols[rng.gen_range(0..self.symbols.len())])
            .collect()
    }

    /// FNV-1a checksum of the ordered symbols
    ///
    /// Stored with binary tables so that a table built over a different
    /// alphabet is detected on open.
    pub fn checksum(&self) -> u64 {
        let mut hash = FNV_OFFSET_BASIS;
        let mut buf = [0u8; 4];
        for c in &self.symbols {
            for byte in c.encode_utf8(&mut buf).bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(FNV_PRIME);
            }
        }
        hash
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet").field(&self.to_string()).finish()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: crate::constants::DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_ALPHABET;

    #[test]
    fn test_default_alphabet_size() {
        let alphabet = Alphabet::default();
        assert_eq!(alphabet.len(), 70);
        assert_eq!(alphabet.to_string(), DEFAULT_ALPHABET);
    }

    #[test]
    fn test_default_matches_new() {
        assert_eq!(Alphabet::new(DEFAULT_ALPHABET).unwrap(), Alphabet::default());
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Alphabet::new(""), Err(AlphabetError::Empty));
    }

    #[test]
    fn test_duplicate_rejected() {
        assert_eq!(Alphabet::new("abca"), Err(AlphabetError::DuplicateSymbol('a')));
    }

    #[test]
    fn test_order_preserved() {
        let alphabet = Alphabet::new("zyx").unwrap();
        assert_eq!(alphabet.symbol(0), 'z');
        assert_eq!(alphabet.symbol(2), 'x');
    }

    #[test]
    fn test_contains_all() {
        let alphabet = Alphabet::new("abc").unwrap();
        assert!(alphabet.contains_all("cab"));
        assert!(!alphabet.contains_all("abd"));
    }

    #[test]
    fn test_random_plaintext() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let alphabet = Alphabet::new("abc").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let plaintext = alphabet.random_plaintext(&mut rng, 16);
        assert_eq!(plaintext.chars().count(), 16);
        assert!(alphabet.contains_all(&plaintext));
    }

    #[test]
    fn test_checksum_depends_on_order() {
        let a = Alphabet::new("abc").unwrap();
        let b = Alphabet::new("cba").unwrap();
        assert_ne!(a.checksum(), b.checksum());
        assert_eq!(a.checksum(), Alphabet::new("abc").unwrap().checksum());
    }
}
