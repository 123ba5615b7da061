//! # ShelfLite Storage
//!
//! Record tables and flat-file persistence for ShelfLite.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of ShelfLite.**
//!
//! Users should depend on the main `shelflite` crate instead, which
//! provides the stable public API.
//!
//! ---
//!
//! A [`Collection`] pairs one in-memory [`Table`] with the [`FlatFile`]
//! that mirrors it on disk:
//!
//! ```text
//! write() ──► RwLock<Table> ──mutate──► persist() ──► books.db.tmp ──rename──► books.db
//! ```
//!
//! Every mutation saves the whole table before the write lock is released,
//! so the file always matches a state some writer finished.

use shelflite_core::{Error, Patchable, Record, Result, Searchable, UpdateReport};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error};

pub mod flatfile;
pub mod table;

pub use flatfile::FlatFile;
pub use table::Table;

/// Durability of collection saves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// fsync the new file before it replaces the old one
    Sync,
    /// Leave flushing to the OS (fastest, unsafe for power loss)
    None,
}

/// Per-collection storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Maximum number of live records, unbounded when `None`
    pub capacity: Option<usize>,
    /// Sync mode for saves
    pub sync_mode: SyncMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            sync_mode: SyncMode::Sync,
        }
    }
}

impl StorageConfig {
    /// Set a maximum number of records
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the sync mode
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }
}

/// One guarded, persisted collection of records
#[derive(Debug)]
pub struct Collection<R: Record> {
    table: RwLock<Table<R>>,
    file: FlatFile,
}

/// Exclusive access to a collection's table.
///
/// Changes made through the guard reach disk only when
/// [`persist`](WriteGuard::persist) is called.
pub struct WriteGuard<'a, R: Record> {
    table: RwLockWriteGuard<'a, Table<R>>,
    file: &'a FlatFile,
}

impl<R: Record> WriteGuard<'_, R> {
    /// Saves the current table contents to the collection file.
    ///
    /// On failure the in-memory table keeps its changes and is ahead of
    /// the file until the next successful save.
    pub fn persist(&self) -> Result<()> {
        self.file.save(self.table.records()).inspect_err(|e| {
            if e.is_persistence() {
                error!(
                    collection = R::KIND,
                    records = self.table.len(),
                    error = %e,
                    "save failed, memory is ahead of disk"
                );
            }
        })
    }
}

impl<R: Record> Deref for WriteGuard<'_, R> {
    type Target = Table<R>;

    fn deref(&self) -> &Table<R> {
        &self.table
    }
}

impl<R: Record> DerefMut for WriteGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut Table<R> {
        &mut self.table
    }
}

impl<R: Record> Collection<R> {
    /// Opens the collection stored in `dir`, loading whatever is on disk.
    ///
    /// Load problems are logged and produce an empty collection.
    pub fn open(dir: impl AsRef<Path>, config: &StorageConfig) -> Self {
        let file = FlatFile::for_collection::<R>(dir, config.sync_mode);
        let table = Table::from_records(file.load::<R>(), config.capacity);

        debug!(
            collection = R::KIND,
            records = table.len(),
            "collection opened"
        );

        Self {
            table: RwLock::new(table),
            file,
        }
    }

    /// Shared access for reads
    pub fn read(&self) -> Result<RwLockReadGuard<'_, Table<R>>> {
        self.table.read().map_err(|_| Error::LockPoisoned)
    }

    /// Exclusive access for mutations
    pub fn write(&self) -> Result<WriteGuard<'_, R>> {
        let table = self.table.write().map_err(|_| Error::LockPoisoned)?;
        Ok(WriteGuard {
            table,
            file: &self.file,
        })
    }

    /// Validates, appends and persists a new record
    pub fn insert(&self, record: R) -> Result<()> {
        let key = record.key();
        let mut table = self.write()?;
        table.insert(record)?;
        debug!(collection = R::KIND, key, "record created");
        table.persist()
    }

    /// Applies a partial patch and persists, even if nothing changed
    pub fn update(&self, key: u64, patch: R::Patch) -> Result<UpdateReport>
    where
        R: Patchable,
    {
        let mut table = self.write()?;
        let report = table.update(key, patch)?;
        debug!(
            collection = R::KIND,
            key,
            applied = ?report.applied,
            rejected = report.rejected.len(),
            "record updated"
        );
        table.persist()?;
        Ok(report)
    }

    /// Removes a record and persists
    pub fn remove(&self, key: u64) -> Result<R> {
        let mut table = self.write()?;
        let removed = table.remove(key)?;
        debug!(collection = R::KIND, key, "record deleted");
        table.persist()?;
        Ok(removed)
    }

    /// Looks up a record by key
    pub fn get(&self, key: u64) -> Result<Option<R>> {
        Ok(self.read()?.get(key).cloned())
    }

    /// Case-insensitive substring search over one text field
    pub fn search(&self, field: R::Field, needle: &str) -> Result<Vec<R>>
    where
        R: Searchable,
    {
        Ok(self.read()?.search(field, needle))
    }

    /// All records in insertion order
    pub fn list(&self) -> Result<Vec<R>> {
        Ok(self.read()?.records().to_vec())
    }

    /// Number of live records
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if the collection holds no records
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Rewrites the collection file from memory
    pub fn flush(&self) -> Result<()> {
        self.write()?.persist()
    }

    /// The file backing this collection
    pub fn file(&self) -> &FlatFile {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelflite_core::{Book, BookPatch, Customer, CustomerField, Money};
    use tempfile::tempdir;

    fn config() -> StorageConfig {
        StorageConfig::default().with_sync_mode(SyncMode::None)
    }

    #[test]
    fn test_storage_config_builders() {
        let config = StorageConfig::default()
            .with_capacity(100)
            .with_sync_mode(SyncMode::None);
        assert_eq!(config.capacity, Some(100));
        assert_eq!(config.sync_mode, SyncMode::None);
        assert_eq!(StorageConfig::default().sync_mode, SyncMode::Sync);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempdir().unwrap();
        {
            let books = Collection::<Book>::open(dir.path(), &config());
            books
                .insert(Book::new(1, "Dune", "Frank Herbert", Money::from_cents(999), 3))
                .unwrap();
            books
                .insert(Book::new(2, "Emma", "Jane Austen", Money::from_cents(850), 1))
                .unwrap();
            books.update(1, BookPatch::new().quantity(7)).unwrap();
            books.remove(2).unwrap();
        }

        let books = Collection::<Book>::open(dir.path(), &config());
        let stored = books.list().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, 7);
    }

    #[test]
    fn test_failed_insert_does_not_touch_file() {
        let dir = tempdir().unwrap();
        let customers = Collection::<Customer>::open(dir.path(), &config());
        customers
            .insert(Customer::new(1, "Ada Lovelace", "5551234567"))
            .unwrap();
        let before = std::fs::read(customers.file().path()).unwrap();

        assert!(customers
            .insert(Customer::new(1, "Grace Hopper", "5559876543"))
            .is_err());
        assert_eq!(std::fs::read(customers.file().path()).unwrap(), before);
    }

    #[test]
    fn test_update_persists_even_when_rejected() {
        let dir = tempdir().unwrap();
        let books = Collection::<Book>::open(dir.path(), &config());
        books
            .insert(Book::new(1, "Dune", "Frank Herbert", Money::from_cents(999), 3))
            .unwrap();
        std::fs::remove_file(books.file().path()).unwrap();

        let report = books.update(1, BookPatch::new().price(Money::ZERO)).unwrap();
        assert!(!report.is_clean());
        assert!(books.file().path().exists());
    }

    #[test]
    fn test_write_guard_persist() {
        let dir = tempdir().unwrap();
        let books = Collection::<Book>::open(dir.path(), &config());
        {
            let mut table = books.write().unwrap();
            table
                .insert(Book::new(1, "Dune", "Frank Herbert", Money::from_cents(999), 3))
                .unwrap();
            table.modify(1, |book| book.quantity -= 1).unwrap();
            table.persist().unwrap();
        }

        let reopened = Collection::<Book>::open(dir.path(), &config());
        assert_eq!(reopened.get(1).unwrap().unwrap().quantity, 2);
    }

    #[test]
    fn test_search_through_collection() {
        let dir = tempdir().unwrap();
        let customers = Collection::<Customer>::open(dir.path(), &config());
        customers
            .insert(Customer::new(1, "Ada Lovelace", "5551234567"))
            .unwrap();

        assert_eq!(customers.search(CustomerField::Name, "LOVE").unwrap().len(), 1);
        assert!(customers.search(CustomerField::Name, "Turing").unwrap().is_empty());
    }
}
