//! FlatFile - whole-collection persistence
//!
//! Each collection lives in one text file: a JSON header line followed by
//! one JSON object per record. Every save rewrites the whole file.
//!
//! ```text
//! {"magic":"SHELFLITE","kind":"books","version":1,"records":2,"checksum":...}
//! {"isbn":1234,"title":"Dune","author":"Frank Herbert","price":1000,"quantity":5}
//! {"isbn":5678,"title":"Emma","author":"Jane Austen","price":850,"quantity":2}
//! ```
//!
//! Saves go to a sibling `.tmp` file that is renamed over the live one, so
//! a crash mid-write leaves the previous contents in place.

use crate::SyncMode;
use serde::{Deserialize, Serialize};
use shelflite_core::format_version::{self, COLLECTION_FORMAT_VERSION, COLLECTION_MAGIC};
use shelflite_core::{Error, Record, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// File extension used for collection files
pub const COLLECTION_FILE_EXT: &str = "db";

/// First line of every collection file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FileHeader {
    magic: String,
    kind: String,
    version: u16,
    records: u64,
    checksum: u32,
}

/// Persistence adapter for one collection file
#[derive(Debug, Clone)]
pub struct FlatFile {
    path: PathBuf,
    sync_mode: SyncMode,
}

impl FlatFile {
    /// Creates an adapter for an explicit file path
    pub fn new(path: impl Into<PathBuf>, sync_mode: SyncMode) -> Self {
        Self {
            path: path.into(),
            sync_mode,
        }
    }

    /// Creates the adapter for `R`'s collection inside `dir`, e.g. `books.db`
    pub fn for_collection<R: Record>(dir: impl AsRef<Path>, sync_mode: SyncMode) -> Self {
        let file_name = format!("{}.{}", R::KIND, COLLECTION_FILE_EXT);
        Self::new(dir.as_ref().join(file_name), sync_mode)
    }

    /// Path of the live file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Writes every record, fully replacing the previous file contents
    pub fn save<R: Record>(&self, records: &[R]) -> Result<()> {
        let mut body = String::new();
        for record in records {
            body.push_str(&serde_json::to_string(record)?);
            body.push('\n');
        }

        let header = FileHeader {
            magic: COLLECTION_MAGIC.to_string(),
            kind: R::KIND.to_string(),
            version: COLLECTION_FORMAT_VERSION,
            records: records.len() as u64,
            checksum: crc32fast::hash(body.as_bytes()),
        };

        let temp_path = self.temp_path();
        if let Err(e) = self.write_file(&temp_path, &header, &body) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &self.path)?;

        debug!(
            collection = R::KIND,
            records = records.len(),
            path = %self.path.display(),
            "collection saved"
        );
        Ok(())
    }

    fn write_file(&self, path: &Path, header: &FileHeader, body: &str) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, header)?;
        writer.write_all(b"\n")?;
        writer.write_all(body.as_bytes())?;
        writer.flush()?;

        if self.sync_mode == SyncMode::Sync {
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    /// Reads the collection back, reporting any integrity problem.
    ///
    /// A missing file is not an error: it is an empty collection.
    pub fn try_load<R: Record>(&self) -> Result<Vec<R>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(
                    collection = R::KIND,
                    path = %self.path.display(),
                    "no collection file, starting empty"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        let (header_line, body) = contents.split_once('\n').unwrap_or((contents.as_str(), ""));
        let header: FileHeader = serde_json::from_str(header_line)
            .map_err(|e| Error::Corruption(format!("bad header: {}", e)))?;
        Self::check_header::<R>(&header, body)?;

        let records = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                serde_json::from_str::<R>(line)
                    .map_err(|e| Error::Corruption(format!("record {}: {}", i + 1, e)))
            })
            .collect::<Result<Vec<R>>>()?;

        if records.len() as u64 != header.records {
            return Err(Error::Corruption(format!(
                "header lists {} records, file holds {}",
                header.records,
                records.len()
            )));
        }

        Ok(records)
    }

    fn check_header<R: Record>(header: &FileHeader, body: &str) -> Result<()> {
        if header.magic != COLLECTION_MAGIC {
            return Err(Error::Corruption(format!("bad magic {:?}", header.magic)));
        }

        if header.kind != R::KIND {
            return Err(Error::Corruption(format!(
                "expected a {} file, found {}",
                R::KIND,
                header.kind
            )));
        }

        if !format_version::collection_version().can_read(header.version) {
            return Err(Error::Corruption(format!(
                "unsupported format version {}",
                header.version
            )));
        }

        let checksum = crc32fast::hash(body.as_bytes());
        if checksum != header.checksum {
            return Err(Error::Corruption(format!(
                "checksum mismatch: expected {:08x}, got {:08x}",
                header.checksum, checksum
            )));
        }

        Ok(())
    }

    /// Reads the collection back, never failing.
    ///
    /// Any problem is logged and yields an empty collection, so a damaged
    /// file cannot stop the store from starting.
    pub fn load<R: Record>(&self) -> Vec<R> {
        match self.try_load::<R>() {
            Ok(records) => records,
            Err(e) => {
                error!(
                    collection = R::KIND,
                    path = %self.path.display(),
                    error = %e,
                    "failed to load collection, starting empty"
                );
                Vec::new()
            }
        }
    }
}
