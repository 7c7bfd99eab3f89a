//! Table file I/O operations
//!
//! This module provides functions for reading and writing whole rainbow
//! tables in the JSON and binary formats. Loading is tolerant: malformed
//! entries are skipped with a warning instead of failing the whole load.

use crate::config::StoreBackend;
use crate::constants::{FILE_FORMAT_VERSION, FILE_HEADER_SIZE, TABLE_FILE_STEM};
use crate::domain::alphabet::Alphabet;
use crate::domain::chain::ChainEntry;
use crate::domain::table_format::{RecordedAlphabet, TableFormatError, TableHeader};
use crate::infra::store::{ChainIndex, StoreError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use memmap2::Mmap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A table read back from disk
#[derive(Debug)]
pub struct LoadedTable {
    /// Step count recorded with the table
    pub steps: u32,
    /// Alphabet recorded with the table
    pub alphabet: RecordedAlphabet,
    /// Chains that passed validation
    pub index: ChainIndex,
    /// Entries dropped as malformed
    pub skipped: usize,
}

/// Get the table file path for a backend
///
/// Format: `{dir}/rainbow_table.{json|pwrt}`
pub fn get_table_path(dir: impl AsRef<Path>, backend: StoreBackend) -> PathBuf {
    dir.as_ref()
        .join(format!("{}.{}", TABLE_FILE_STEM, backend.file_extension()))
}

/// Write a table file through a sibling temp file renamed over `path`
///
/// The previous file stays intact until the rename, so a failed write never
/// loses chains committed by an earlier save.
fn write_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), StoreError>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Save a table in the given backend format
pub fn save_table(
    path: impl AsRef<Path>,
    backend: StoreBackend,
    steps: u32,
    alphabet: &Alphabet,
    index: &ChainIndex,
) -> Result<(), StoreError> {
    match backend {
        StoreBackend::Json => save_json_table(path, steps, alphabet, index),
        StoreBackend::Binary => save_binary_table(path, steps, alphabet, index),
    }
}

/// Load a table in the given backend format
pub fn load_table(path: impl AsRef<Path>, backend: StoreBackend) -> Result<LoadedTable, StoreError> {
    match backend {
        StoreBackend::Json => load_json_table(path),
        StoreBackend::Binary => load_binary_table(path),
    }
}

// =============================================================================
// JSON format
// =============================================================================

#[derive(Serialize)]
struct JsonTable<'a> {
    version: u16,
    steps: u32,
    alphabet: String,
    tables: BTreeMap<String, BTreeMap<&'a str, &'a [String]>>,
}

/// Save table as a JSON document
///
/// Layout: `{"version", "steps", "alphabet", "tables": {"<length>": {"<end>": [starts]}}}`
pub fn save_json_table(
    path: impl AsRef<Path>,
    steps: u32,
    alphabet: &Alphabet,
    index: &ChainIndex,
) -> Result<(), StoreError> {
    let tables: BTreeMap<String, BTreeMap<&str, &[String]>> = index
        .tables()
        .iter()
        .map(|(length, table)| {
            let ends: BTreeMap<&str, &[String]> = table
                .iter()
                .map(|(end, starts)| (end.as_str(), starts.as_slice()))
                .collect();
            (length.to_string(), ends)
        })
        .collect();

    let document = JsonTable {
        version: FILE_FORMAT_VERSION,
        steps,
        alphabet: alphabet.to_string(),
        tables,
    };

    write_atomically(path.as_ref(), |writer| {
        serde_json::to_writer(writer, &document)?;
        Ok(())
    })
}

/// Load a JSON table document
pub fn load_json_table(path: impl AsRef<Path>) -> Result<LoadedTable, StoreError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let value: Value = serde_json::from_reader(reader)?;

    let Value::Object(root) = value else {
        return Err(TableFormatError::InvalidMagic.into());
    };

    if let Some(version) = root.get("version") {
        let version = version
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .ok_or(TableFormatError::InvalidMagic)?;
        if version != FILE_FORMAT_VERSION {
            return Err(TableFormatError::UnsupportedVersion(version).into());
        }
    }

    let steps = root
        .get("steps")
        .and_then(Value::as_u64)
        .and_then(|s| u32::try_from(s).ok())
        .ok_or(TableFormatError::MissingStepCount)?;

    let alphabet = match root.get("alphabet") {
        None => RecordedAlphabet::Unrecorded,
        Some(Value::String(symbols)) => match Alphabet::new(symbols) {
            Ok(alphabet) => RecordedAlphabet::Checksum(alphabet.checksum()),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Recorded alphabet is invalid");
                RecordedAlphabet::Unreadable
            }
        },
        Some(_) => {
            tracing::warn!(path = %path.display(), "Recorded alphabet is not a string");
            RecordedAlphabet::Unreadable
        }
    };

    let mut index = ChainIndex::new();
    let mut skipped = 0usize;

    match root.get("tables") {
        None => {}
        Some(Value::Object(tables)) => {
            for (length_key, table) in tables {
                let Ok(length) = length_key.parse::<usize>() else {
                    tracing::warn!(key = %length_key, "Skipping table with non-numeric length key");
                    skipped += 1;
                    continue;
                };
                let Value::Object(ends) = table else {
                    tracing::warn!(length, "Skipping table that is not an object");
                    skipped += 1;
                    continue;
                };
                skipped += load_json_ends(&mut index, length, ends);
            }
        }
        Some(_) => {
            tracing::warn!(path = %path.display(), "Skipping \"tables\" field that is not an object");
            skipped += 1;
        }
    }

    if skipped > 0 {
        tracing::warn!(path = %path.display(), skipped, "Skipped malformed table entries");
    }

    Ok(LoadedTable {
        steps,
        alphabet,
        index,
        skipped,
    })
}

/// Insert one length's end → starts map, returning the number of skipped entries
fn load_json_ends(
    index: &mut ChainIndex,
    length: usize,
    ends: &serde_json::Map<String, Value>,
) -> usize {
    let mut skipped = 0;

    for (end, starts) in ends {
        let Value::Array(starts) = starts else {
            tracing::warn!(length, end = %end, "Skipping end whose starts are not a list");
            skipped += 1;
            continue;
        };

        for start in starts {
            let Some(start) = start.as_str() else {
                tracing::warn!(length, end = %end, "Skipping non-string start");
                skipped += 1;
                continue;
            };

            let entry = ChainEntry::new(start, end.as_str(), length);
            if !entry.is_well_formed() {
                tracing::warn!(length, start, end = %end, "Skipping chain with wrong plaintext length");
                skipped += 1;
                continue;
            }
            index.insert(entry);
        }
    }

    skipped
}

// =============================================================================
// Binary format
// =============================================================================

/// Save table in binary form
///
/// Layout: 64-byte header, then per chain
/// `u32 length | u16 start_len | start | u16 end_len | end` (little-endian).
pub fn save_binary_table(
    path: impl AsRef<Path>,
    steps: u32,
    alphabet: &Alphabet,
    index: &ChainIndex,
) -> Result<(), StoreError> {
    let header = TableHeader::new(steps, alphabet, index.len() as u64);

    write_atomically(path.as_ref(), |writer| {
        writer.write_all(&header.to_bytes())?;
        for entry in index.iter() {
            write_record(writer, &entry)?;
        }
        Ok(())
    })
}

/// Write one `u32 length | u16 start_len | start | u16 end_len | end` record
fn write_record(writer: &mut dyn Write, entry: &ChainEntry) -> Result<(), StoreError> {
    let malformed = || StoreError::MalformedChain {
        start: entry.start.clone(),
        length: entry.length,
    };
    let length = u32::try_from(entry.length).map_err(|_| malformed())?;
    let start_len = u16::try_from(entry.start.len()).map_err(|_| malformed())?;
    let end_len = u16::try_from(entry.end.len()).map_err(|_| malformed())?;

    writer.write_u32::<LittleEndian>(length)?;
    writer.write_u16::<LittleEndian>(start_len)?;
    writer.write_all(entry.start.as_bytes())?;
    writer.write_u16::<LittleEndian>(end_len)?;
    writer.write_all(entry.end.as_bytes())?;
    Ok(())
}

/// Load a binary table through a read-only memory map
pub fn load_binary_table(path: impl AsRef<Path>) -> Result<LoadedTable, StoreError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_len = file.metadata()?.len();

    if file_len < FILE_HEADER_SIZE as u64 {
        return Err(TableFormatError::InvalidFileSize {
            expected: FILE_HEADER_SIZE as u64,
            found: file_len,
        }
        .into());
    }

    // SAFETY: the map is read-only and dropped before this function returns;
    // saves replace the file by rename and never rewrite it in place.
    let mmap = unsafe { Mmap::map(&file)? };

    let mut header_bytes = [0u8; FILE_HEADER_SIZE];
    header_bytes.copy_from_slice(&mmap[..FILE_HEADER_SIZE]);
    let header = TableHeader::from_bytes(&header_bytes)?;

    let mut cursor = &mmap[FILE_HEADER_SIZE..];
    let mut index = ChainIndex::new();
    let mut skipped = 0usize;
    let mut read = 0u64;

    while read < header.chain_count {
        let Some(record) = read_record(&mut cursor) else {
            tracing::warn!(
                path = %path.display(),
                expected = header.chain_count,
                read,
                "Table file is truncated, keeping records read so far"
            );
            break;
        };
        read += 1;

        match record {
            Ok(entry) if entry.is_well_formed() => {
                index.insert(entry);
            }
            Ok(entry) => {
                tracing::warn!(length = entry.length, start = %entry.start, "Skipping chain with wrong plaintext length");
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping chain with invalid UTF-8");
                skipped += 1;
            }
        }
    }

    if !cursor.is_empty() && read == header.chain_count {
        tracing::warn!(path = %path.display(), trailing = cursor.len(), "Ignoring trailing bytes after last record");
    }

    Ok(LoadedTable {
        steps: header.steps,
        alphabet: RecordedAlphabet::Checksum(header.alphabet_checksum),
        index,
        skipped,
    })
}

/// Read one record; `None` when the input ends mid-record
fn read_record(cursor: &mut &[u8]) -> Option<Result<ChainEntry, std::str::Utf8Error>> {
    let length = cursor.read_u32::<LittleEndian>().ok()? as usize;
    let start = read_field(cursor)?;
    let end = read_field(cursor)?;

    let entry = std::str::from_utf8(start).and_then(|start| {
        let end = std::str::from_utf8(end)?;
        Ok(ChainEntry::new(start, end, length))
    });
    Some(entry)
}

fn read_field<'a>(cursor: &mut &'a [u8]) -> Option<&'a [u8]> {
    let len = cursor.read_u16::<LittleEndian>().ok()? as usize;
    if cursor.len() < len {
        return None;
    }
    let (field, rest) = cursor.split_at(len);
    *cursor = rest;
    Some(field)
}
