//! File-backed chain store
//!
//! The whole table is loaded into a `ChainIndex` on open and written back
//! wholesale after every insert batch. A batch whose write fails is taken
//! back out of the index, so memory and disk hold the same committed chains. The recorded step count and alphabet
//! are checked on open; a table built with other parameters is never queried.

use crate::config::{RainbowConfig, StoreBackend};
use crate::domain::alphabet::Alphabet;
use crate::domain::chain::ChainEntry;
use crate::domain::table_format::{ValidationOptions, validate_metadata};
use crate::infra::store::{ChainIndex, ChainStore, StoreError, StoreFactory, check_well_formed};
use crate::infra::table_io::{load_table, save_table};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What to do when the persisted table was built with other parameters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Fail with `StepCountMismatch` / `AlphabetMismatch`
    #[default]
    Abort,
    /// Start from an empty table; the old file is replaced on the next write
    Discard,
}

/// Chain store persisted as a single JSON or binary file
#[derive(Debug)]
pub struct FileChainStore {
    path: PathBuf,
    backend: StoreBackend,
    steps: u32,
    alphabet: Alphabet,
    index: ChainIndex,
}

impl FileChainStore {
    /// Open the table at `path`, validating it against `steps` and `alphabet`
    ///
    /// A missing file opens as an empty, uninitialised store.
    pub fn open(
        path: impl Into<PathBuf>,
        backend: StoreBackend,
        steps: u32,
        alphabet: Alphabet,
        policy: MismatchPolicy,
    ) -> Result<Self, StoreError> {
        let path = path.into();

        let index = match load_table(&path, backend) {
            Ok(loaded) => {
                let options = ValidationOptions::for_table(steps, &alphabet);
                match validate_metadata(loaded.steps, loaded.alphabet, &options) {
                    Ok(()) => {
                        tracing::info!(
                            path = %path.display(),
                            chains = loaded.index.len(),
                            lengths = ?loaded.index.lengths(),
                            "Loaded rainbow table"
                        );
                        loaded.index
                    }
                    Err(e) if policy == MismatchPolicy::Discard => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            discarded = loaded.index.len(),
                            "Discarding table built with different parameters"
                        );
                        ChainIndex::new()
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No table on disk, starting empty");
                ChainIndex::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            backend,
            steps,
            alphabet,
            index,
        })
    }

    /// Open the table described by `config`
    pub fn open_with_config(
        config: &RainbowConfig,
        policy: MismatchPolicy,
    ) -> Result<Self, StoreError> {
        Self::open(
            config.table_path(),
            config.backend,
            config.steps,
            config.alphabet.clone(),
            policy,
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Number of stored chains
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Write the whole table to disk
    pub fn flush(&self) -> Result<(), StoreError> {
        save_table(
            &self.path,
            self.backend,
            self.steps,
            &self.alphabet,
            &self.index,
        )?;
        tracing::debug!(path = %self.path.display(), chains = self.index.len(), "Saved rainbow table");
        Ok(())
    }
}

impl ChainStore for FileChainStore {
    fn add_chains(&mut self, rows: &[ChainEntry]) -> Result<usize, StoreError> {
        check_well_formed(rows)?;

        let inserted: Vec<&ChainEntry> = rows
            .iter()
            .filter(|row| self.index.insert((*row).clone()))
            .collect();
        if inserted.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.flush() {
            for row in &inserted {
                self.index.remove(row);
            }
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                rolled_back = inserted.len(),
                "Failed to save batch, keeping previously committed chains"
            );
            return Err(e);
        }
        Ok(inserted.len())
    }

    fn get_start_candidates(&self, end: &str, length: usize) -> Result<Vec<String>, StoreError> {
        self.index.get_start_candidates(end, length)
    }

    fn get_available_lengths(&self) -> Result<Vec<usize>, StoreError> {
        self.index.get_available_lengths()
    }
}

/// Opens read handles onto one table file, one per lookup worker
#[derive(Clone, Debug)]
pub struct FileStoreFactory {
    path: PathBuf,
    backend: StoreBackend,
    steps: u32,
    alphabet: Alphabet,
}

impl FileStoreFactory {
    pub fn new(
        path: impl Into<PathBuf>,
        backend: StoreBackend,
        steps: u32,
        alphabet: Alphabet,
    ) -> Self {
        Self {
            path: path.into(),
            backend,
            steps,
            alphabet,
        }
    }

    pub fn from_config(config: &RainbowConfig) -> Self {
        Self::new(
            config.table_path(),
            config.backend,
            config.steps,
            config.alphabet.clone(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreFactory for FileStoreFactory {
    type Store = FileChainStore;

    fn open_store(&self) -> Result<Self::Store, StoreError> {
        // Lookups never discard: a mismatched table is a hard error here.
        FileChainStore::open(
            self.path.clone(),
            self.backend,
            self.steps,
            self.alphabet.clone(),
            MismatchPolicy::Abort,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table_format::TableFormatError;
    use tempfile::TempDir;

    fn alphabet() -> Alphabet {
        Alphabet::new("abcdefghijklmnopqrstuvwxyz").unwrap()
    }

    fn open(path: &Path, backend: StoreBackend, steps: u32) -> Result<FileChainStore, StoreError> {
        FileChainStore::open(path, backend, steps, alphabet(), MismatchPolicy::Abort)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir.path().join("none.json"), StoreBackend::Json, 10).unwrap();

        assert!(store.is_empty());
        assert!(store.get_available_lengths().unwrap().is_empty());
    }

    #[test]
    fn test_add_chains_persists() {
        for backend in [StoreBackend::Json, StoreBackend::Binary] {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("table");

            let mut store = open(&path, backend, 10).unwrap();
            store
                .add_chains(&[
                    ChainEntry::new("aaaa", "zzzz", 4),
                    ChainEntry::new("bbbbb", "yyyyy", 5),
                ])
                .unwrap();
            drop(store);

            let reopened = open(&path, backend, 10).unwrap();
            assert_eq!(reopened.len(), 2, "backend {}", backend);
            assert_eq!(
                reopened.get_start_candidates("zzzz", 4).unwrap(),
                vec!["aaaa"]
            );
            assert_eq!(reopened.get_available_lengths().unwrap(), vec![4, 5]);
        }
    }

    #[test]
    fn test_failed_batch_keeps_committed_chains() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.pwrt");
        let first = [
            ChainEntry::new("aaaa", "zzzz", 4),
            ChainEntry::new("bbbb", "yyyy", 4),
        ];
        // well-formed, but its start does not fit the record's u16 field
        let second = [
            ChainEntry::new("cccc", "xxxx", 4),
            ChainEntry::new("a".repeat(70_000), "b".repeat(70_000), 70_000),
        ];

        let mut store = open(&path, StoreBackend::Binary, 10).unwrap();
        assert_eq!(store.add_chains(&first).unwrap(), 2);

        let result = store.add_chains(&second);
        assert!(matches!(result, Err(StoreError::MalformedChain { length: 70_000, .. })));
        assert_eq!(store.len(), 2);
        assert!(store.get_start_candidates("xxxx", 4).unwrap().is_empty());
        assert_eq!(store.get_available_lengths().unwrap(), vec![4]);
        drop(store);

        let reopened = open(&path, StoreBackend::Binary, 10).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get_start_candidates("zzzz", 4).unwrap(), vec!["aaaa"]);
        assert_eq!(reopened.get_start_candidates("yyyy", 4).unwrap(), vec!["bbbb"]);
        assert!(reopened.get_start_candidates("xxxx", 4).unwrap().is_empty());
    }

    #[test]
    fn test_batch_retried_after_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.pwrt");
        let row = ChainEntry::new("cccc", "xxxx", 4);
        let oversized = ChainEntry::new("a".repeat(70_000), "b".repeat(70_000), 70_000);

        let mut store = open(&path, StoreBackend::Binary, 10).unwrap();
        assert!(store.add_chains(&[row.clone(), oversized]).is_err());
        assert!(store.is_empty());

        assert_eq!(store.add_chains(&[row]).unwrap(), 1);
        assert_eq!(open(&path, StoreBackend::Binary, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_recorded_alphabet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");

        for recorded in [r#""aab""#, r#"["a", "b"]"#] {
            let document = format!(
                r#"{{"steps": 10, "alphabet": {}, "tables": {{"4": {{"zzzz": ["aaaa"]}}}}}}"#,
                recorded
            );
            std::fs::write(&path, document).unwrap();

            let result = open(&path, StoreBackend::Json, 10);
            assert!(
                matches!(result, Err(StoreError::Format(TableFormatError::AlphabetMismatch))),
                "alphabet {}",
                recorded
            );

            let store = FileChainStore::open(
                &path,
                StoreBackend::Json,
                10,
                alphabet(),
                MismatchPolicy::Discard,
            )
            .unwrap();
            assert!(store.is_empty());
        }
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");
        let rows = [ChainEntry::new("aaaa", "zzzz", 4)];

        let mut store = open(&path, StoreBackend::Json, 10).unwrap();
        assert_eq!(store.add_chains(&rows).unwrap(), 1);
        drop(store);

        let mut store = open(&path, StoreBackend::Json, 10).unwrap();
        assert_eq!(store.add_chains(&rows).unwrap(), 0);
        assert_eq!(store.get_start_candidates("zzzz", 4).unwrap(), vec!["aaaa"]);
    }

    #[test]
    fn test_step_mismatch_aborts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");

        let mut store = open(&path, StoreBackend::Json, 10).unwrap();
        store.add_chains(&[ChainEntry::new("aaaa", "zzzz", 4)]).unwrap();

        let result = open(&path, StoreBackend::Json, 20);
        let err = result.unwrap_err();
        assert!(err.is_mismatch());
        assert!(matches!(
            err,
            StoreError::Format(TableFormatError::StepCountMismatch {
                expected: 20,
                found: 10
            })
        ));
    }

    #[test]
    fn test_alphabet_mismatch_aborts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.pwrt");

        let mut store = open(&path, StoreBackend::Binary, 10).unwrap();
        store.add_chains(&[ChainEntry::new("aaaa", "zzzz", 4)]).unwrap();

        let result = FileChainStore::open(
            &path,
            StoreBackend::Binary,
            10,
            Alphabet::default(),
            MismatchPolicy::Abort,
        );
        assert!(matches!(
            result,
            Err(StoreError::Format(TableFormatError::AlphabetMismatch))
        ));
    }

    #[test]
    fn test_discard_policy_replaces_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");

        let mut store = open(&path, StoreBackend::Json, 10).unwrap();
        store.add_chains(&[ChainEntry::new("aaaa", "zzzz", 4)]).unwrap();

        let mut store = FileChainStore::open(
            &path,
            StoreBackend::Json,
            20,
            alphabet(),
            MismatchPolicy::Discard,
        )
        .unwrap();
        assert!(store.is_empty());

        store.add_chains(&[ChainEntry::new("cccc", "xxxx", 4)]).unwrap();
        let reopened = open(&path, StoreBackend::Json, 20).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(reopened.get_start_candidates("zzzz", 4).unwrap().is_empty());
    }

    #[test]
    fn test_factory_opens_independent_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");
        let mut store = open(&path, StoreBackend::Json, 10).unwrap();
        store.add_chains(&[ChainEntry::new("aaaa", "zzzz", 4)]).unwrap();

        let factory = FileStoreFactory::new(&path, StoreBackend::Json, 10, alphabet());
        let a = factory.open_store().unwrap();
        let b = factory.open_store().unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_factory_rejects_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("table.json");
        let mut store = open(&path, StoreBackend::Json, 10).unwrap();
        store.add_chains(&[ChainEntry::new("aaaa", "zzzz", 4)]).unwrap();

        let factory = FileStoreFactory::new(&path, StoreBackend::Json, 11, alphabet());
        assert!(factory.open_store().unwrap_err().is_mismatch());
    }

    #[test]
    fn test_from_config_uses_table_path() {
        let dir = TempDir::new().unwrap();
        let config = RainbowConfig::default()
            .with_data_path(dir.path())
            .with_backend(StoreBackend::Binary);

        let factory = FileStoreFactory::from_config(&config);
        assert_eq!(factory.path(), dir.path().join("rainbow_table.pwrt"));
    }
}
