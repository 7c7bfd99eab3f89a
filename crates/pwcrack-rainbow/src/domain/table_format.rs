//! Rainbow table file format definitions
//!
//! This module defines the binary header and the metadata checks shared by
//! every persisted table format. A table is only valid for the step count and
//! alphabet it was built with.

use crate::constants::{FILE_FORMAT_VERSION, FILE_HEADER_SIZE, TABLE_MAGIC};
use crate::domain::alphabet::Alphabet;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Binary table file header metadata
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableHeader {
    /// File format version
    pub version: u16,
    /// Chain depth the table was built with
    pub steps: u32,
    /// FNV-1a checksum of the alphabet
    pub alphabet_checksum: u64,
    /// Number of chain records following the header
    pub chain_count: u64,
    /// Creation timestamp (Unix epoch seconds)
    pub created_at: u64,
}

impl TableHeader {
    /// Create a new header for the given parameters
    pub fn new(steps: u32, alphabet: &Alphabet, chain_count: u64) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            version: FILE_FORMAT_VERSION,
            steps,
            alphabet_checksum: alphabet.checksum(),
            chain_count,
            created_at,
        }
    }

    /// Serialize header to bytes (64 bytes)
    pub fn to_bytes(&self) -> [u8; FILE_HEADER_SIZE] {
        let mut buf = [0u8; FILE_HEADER_SIZE];

        buf[0..8].copy_from_slice(&TABLE_MAGIC);
        buf[8..10].copy_from_slice(&self.version.to_le_bytes());
        // 10..12 reserved
        buf[12..16].copy_from_slice(&self.steps.to_le_bytes());
        buf[16..24].copy_from_slice(&self.alphabet_checksum.to_le_bytes());
        buf[24..32].copy_from_slice(&self.chain_count.to_le_bytes());
        buf[32..40].copy_from_slice(&self.created_at.to_le_bytes());
        // 40..64 reserved

        buf
    }

    /// Deserialize header from bytes
    pub fn from_bytes(buf: &[u8; FILE_HEADER_SIZE]) -> Result<Self, TableFormatError> {
        if buf[0..8] != TABLE_MAGIC {
            return Err(TableFormatError::InvalidMagic);
        }

        let version = u16::from_le_bytes([buf[8], buf[9]]);
        if version != FILE_FORMAT_VERSION {
            return Err(TableFormatError::UnsupportedVersion(version));
        }

        Ok(Self {
            version,
            steps: u32::from_le_bytes([buf[12], buf[13], buf[14], buf[15]]),
            alphabet_checksum: read_u64(&buf[16..24]),
            chain_count: read_u64(&buf[24..32]),
            created_at: read_u64(&buf[32..40]),
        })
    }
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Validation options for table loading
#[derive(Clone, Debug, Default)]
pub struct ValidationOptions {
    /// Expected chain depth (None = skip validation)
    pub expected_steps: Option<u32>,
    /// Expected alphabet checksum (None = skip validation)
    pub expected_alphabet_checksum: Option<u64>,
}

impl ValidationOptions {
    /// Create options requiring the table to match the configured parameters
    pub fn for_table(steps: u32, alphabet: &Alphabet) -> Self {
        Self {
            expected_steps: Some(steps),
            expected_alphabet_checksum: Some(alphabet.checksum()),
        }
    }
}

/// Table format errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableFormatError {
    /// Invalid magic number (not a valid table file)
    #[error("Invalid file format: not a valid rainbow table file")]
    InvalidMagic,
    /// Unsupported format version
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u16),
    /// File too short to hold a header
    #[error("Invalid file size: expected at least {expected} bytes, found {found} bytes")]
    InvalidFileSize { expected: u64, found: u64 },
    /// Table carries no step count
    #[error("Table file does not record its step count")]
    MissingStepCount,
    /// Step count mismatch
    #[error("Step count mismatch: configured {expected}, table was built with {found}")]
    StepCountMismatch { expected: u32, found: u32 },
    /// Alphabet mismatch
    #[error("Alphabet mismatch: table was built over a different alphabet")]
    AlphabetMismatch,
}

/// Alphabet information recorded with a persisted table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedAlphabet {
    /// The table does not record its alphabet
    Unrecorded,
    /// FNV-1a checksum of the recorded alphabet
    Checksum(u64),
    /// An alphabet is recorded but cannot be read back
    Unreadable,
}

/// Validate table metadata against options
///
/// An unrecorded alphabet skips the alphabet check; an unreadable one never
/// matches an expected alphabet.
pub fn validate_metadata(
    steps: u32,
    alphabet: RecordedAlphabet,
    options: &ValidationOptions,
) -> Result<(), TableFormatError> {
    if let Some(expected) = options.expected_steps
        && steps != expected
    {
        return Err(TableFormatError::StepCountMismatch {
            expected,
            found: steps,
        });
    }

    if let Some(expected) = options.expected_alphabet_checksum {
        match alphabet {
            RecordedAlphabet::Unrecorded => {}
            RecordedAlphabet::Checksum(found) if found == expected => {}
            RecordedAlphabet::Checksum(_) | RecordedAlphabet::Unreadable => {
                return Err(TableFormatError::AlphabetMismatch);
            }
        }
    }

    Ok(())
}

/// Validate a binary header against options
pub fn validate_header(
    header: &TableHeader,
    options: &ValidationOptions,
) -> Result<(), TableFormatError> {
    validate_metadata(
        header.steps,
        RecordedAlphabet::Checksum(header.alphabet_checksum),
        options,
    )
}
