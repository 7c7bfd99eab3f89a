//! Rainbow table related constants
//!
//! Defaults here are only starting points for `RainbowConfig`; a table on disk
//! records the values it was built with.

// =============================================================================
// Rainbow table parameters
// =============================================================================

/// Default alphabet: ASCII letters, digits and a handful of symbols (70 symbols)
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#%&*()";

/// Default chain depth (hash → reduce rounds per chain)
pub const DEFAULT_STEPS: u32 = 1000;

/// Default share of the requested rows persisted per build batch (10%)
pub const DEFAULT_BATCH_FRACTION: f64 = 0.1;

// =============================================================================
// Hash function parameters
// =============================================================================

/// SHA-512 digest size in bytes
pub const DIGEST_SIZE: usize = 64;

/// SHA-512 digest size as lowercase hex
pub const DIGEST_HEX_LEN: usize = DIGEST_SIZE * 2;

// =============================================================================
// File format
// =============================================================================

/// Default directory holding the persisted table
pub const DEFAULT_DATA_PATH: &str = "data";

/// Base name of the persisted table file
pub const TABLE_FILE_STEM: &str = "rainbow_table";

/// Extension of the JSON table file
pub const JSON_FILE_EXTENSION: &str = "json";

/// Extension of the binary table file
pub const BINARY_FILE_EXTENSION: &str = "pwrt";

/// Magic bytes at the start of a binary table file
pub const TABLE_MAGIC: [u8; 8] = *b"PWRTABLE";

/// Current on-disk format version (shared by JSON and binary)
pub const FILE_FORMAT_VERSION: u16 = 1;

/// Binary header size in bytes
pub const FILE_HEADER_SIZE: usize = 64;
