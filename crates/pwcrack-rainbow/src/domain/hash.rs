//! Hash function implementations
//!
//! This module wraps SHA-512, the one-way function the rainbow table inverts,
//! and the `Digest` value type passed between hashing and reduction.

use crate::constants::{DIGEST_HEX_LEN, DIGEST_SIZE};
use sha2::{Digest as _, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Digest parsing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DigestError {
    #[error("digest must be {expected} hex characters, got {found}")]
    InvalidLength { expected: usize, found: usize },
    #[error("digest is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// SHA-512 digest
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    pub fn from_bytes(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Parse a hex digest (case-insensitive)
    pub fn from_hex(text: &str) -> Result<Self, DigestError> {
        let text = text.trim();
        if text.len() != DIGEST_HEX_LEN {
            return Err(DigestError::InvalidLength {
                expected: DIGEST_HEX_LEN,
                found: text.len(),
            });
        }

        let mut bytes = [0u8; DIGEST_SIZE];
        hex::decode_to_slice(text, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Lowercase hex encoding written into a stack buffer
    pub fn encode_hex(&self, buf: &mut [u8; DIGEST_HEX_LEN]) {
        // The buffer is sized exactly for the digest, so encoding cannot fail.
        let _ = hex::encode_to_slice(self.0, buf);
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; DIGEST_HEX_LEN];
        self.encode_hex(&mut buf);
        // hex output is always ASCII
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Calculate the SHA-512 digest of a plaintext (UTF-8 bytes)
#[inline]
pub fn hash_plaintext(plaintext: &str) -> Digest {
    let mut bytes = [0u8; DIGEST_SIZE];
    bytes.copy_from_slice(&Sha512::digest(plaintext.as_bytes()));
    Digest(bytes)
}
