//! Chain store abstraction
//!
//! `ChainStore` is the capability set the build and crack paths need from a
//! backend. `ChainIndex` is the in-memory backend; file backends keep one as
//! their cache (see `file_store`).

use crate::domain::chain::ChainEntry;
use crate::domain::table_format::TableFormatError;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Format(#[from] TableFormatError),

    #[error("chain starting at {start:?} does not hold {length} symbols at both ends")]
    MalformedChain { start: String, length: usize },
}

impl StoreError {
    /// True when the persisted table was built with other parameters
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::Format(
                TableFormatError::StepCountMismatch { .. } | TableFormatError::AlphabetMismatch
            )
        )
    }
}

/// Persistent index of (start, end, length) chains
///
/// `start` is the uniqueness key; `(end, length)` is the lookup key.
pub trait ChainStore {
    /// Bulk insert; rows whose start is already stored are ignored
    ///
    /// Returns the number of rows actually inserted.
    fn add_chains(&mut self, rows: &[ChainEntry]) -> Result<usize, StoreError>;

    /// All starts whose chain of `length` terminates at `end`
    fn get_start_candidates(&self, end: &str, length: usize) -> Result<Vec<String>, StoreError>;

    /// Distinct plaintext lengths present, ascending
    fn get_available_lengths(&self) -> Result<Vec<usize>, StoreError>;
}

/// Opens independent store handles, one per lookup worker
pub trait StoreFactory: Sync {
    type Store: ChainStore;

    fn open_store(&self) -> Result<Self::Store, StoreError>;
}

/// In-memory chain index: length → end → starts
#[derive(Clone, Debug, Default)]
pub struct ChainIndex {
    tables: BTreeMap<usize, FxHashMap<String, Vec<String>>>,
    starts: FxHashSet<String>,
    len: usize,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one chain; returns false if its start is already present
    pub fn insert(&mut self, entry: ChainEntry) -> bool {
        if self.starts.contains(&entry.start) {
            return false;
        }
        self.starts.insert(entry.start.clone());
        self.tables
            .entry(entry.length)
            .or_default()
            .entry(entry.end)
            .or_default()
            .push(entry.start);
        self.len += 1;
        true
    }

    /// Number of stored chains
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains_start(&self, start: &str) -> bool {
        self.starts.contains(start)
    }

    /// Distinct lengths, ascending
    pub fn lengths(&self) -> Vec<usize> {
        self.tables.keys().copied().collect()
    }

    /// Starts stored for `(end, length)`
    pub fn candidates(&self, end: &str, length: usize) -> &[String] {
        self.tables
            .get(&length)
            .and_then(|table| table.get(end))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Per-length tables (end → starts)
    pub fn tables(&self) -> &BTreeMap<usize, FxHashMap<String, Vec<String>>> {
        &self.tables
    }

    /// Iterate every stored chain
    pub fn iter(&self) -> impl Iterator<Item = ChainEntry> + '_ {
        self.tables.iter().flat_map(|(&length, table)| {
            table.iter().flat_map(move |(end, starts)| {
                starts
                    .iter()
                    .map(move |start| ChainEntry::new(start.as_str(), end.as_str(), length))
            })
        })
    }

    /// Remove one chain; returns false if it is not stored
    ///
    /// Empty end buckets and length tables are dropped so `lengths` stays exact.
    pub fn remove(&mut self, entry: &ChainEntry) -> bool {
        let Some(table) = self.tables.get_mut(&entry.length) else {
            return false;
        };
        let Some(starts) = table.get_mut(&entry.end) else {
            return false;
        };
        let before = starts.len();
        starts.retain(|start| start != &entry.start);
        if starts.len() == before {
            return false;
        }

        let end_empty = starts.is_empty();
        if end_empty {
            table.remove(&entry.end);
        }
        if table.is_empty() {
            self.tables.remove(&entry.length);
        }
        self.starts.remove(&entry.start);
        self.len -= 1;
        true
    }
}

/// Reject the batch if any row does not hold `length` symbols at both ends
pub(crate) fn check_well_formed(rows: &[ChainEntry]) -> Result<(), StoreError> {
    match rows.iter().find(|row| !row.is_well_formed()) {
        Some(bad) => Err(StoreError::MalformedChain {
            start: bad.start.clone(),
            length: bad.length,
        }),
        None => Ok(()),
    }
}

impl FromIterator<ChainEntry> for ChainIndex {
    fn from_iter<I: IntoIterator<Item = ChainEntry>>(iter: I) -> Self {
        let mut index = Self::new();
        for entry in iter {
            index.insert(entry);
        }
        index
    }
}

impl ChainStore for ChainIndex {
    fn add_chains(&mut self, rows: &[ChainEntry]) -> Result<usize, StoreError> {
        check_well_formed(rows)?;
        Ok(rows.iter().filter(|row| self.insert((*row).clone())).count())
    }

    fn get_start_candidates(&self, end: &str, length: usize) -> Result<Vec<String>, StoreError> {
        Ok(self.candidates(end, length).to_vec())
    }

    fn get_available_lengths(&self) -> Result<Vec<usize>, StoreError> {
        Ok(self.lengths())
    }
}

impl StoreFactory for ChainIndex {
    type Store = ChainIndex;

    fn open_store(&self) -> Result<Self::Store, StoreError> {
        Ok(self.clone())
    }
}
