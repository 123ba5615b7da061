//! Table - ordered, keyed in-memory collection
//!
//! Records live in a `Vec` in insertion order, with a hash index from key
//! to position. Listing walks the vector, so reports see records in the
//! order they were created. Removal shifts the tail down instead of
//! swapping with the last element, which keeps that order intact.

use shelflite_core::{Error, Patchable, Record, Result, Searchable, UpdateReport};
use std::collections::HashMap;
use tracing::warn;

/// An ordered collection of records with a unique key
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    /// Records in insertion order
    records: Vec<R>,
    /// Key -> position in `records`
    index: HashMap<u64, usize>,
    /// Optional ceiling on the number of live records
    capacity: Option<usize>,
}

impl<R: Record> Table<R> {
    /// Creates an empty table
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            capacity,
        }
    }

    /// Builds a table from records read back from disk.
    ///
    /// Field constraints are not re-checked. A record whose key repeats an
    /// earlier one is dropped, and loading stops once `capacity` is reached.
    pub fn from_records(records: Vec<R>, capacity: Option<usize>) -> Self {
        let mut table = Self::new(capacity);

        for record in records {
            if table.is_full() {
                warn!(
                    collection = R::KIND,
                    capacity = table.records.len(),
                    "capacity reached while loading, remaining records ignored"
                );
                break;
            }

            let key = record.key();
            if table.index.contains_key(&key) {
                warn!(collection = R::KIND, key, "duplicate key on load, record skipped");
                continue;
            }

            table.push(record);
        }

        table
    }

    fn push(&mut self, record: R) {
        self.index.insert(record.key(), self.records.len());
        self.records.push(record);
    }

    /// Returns true if the table has reached its configured capacity
    pub fn is_full(&self) -> bool {
        self.capacity
            .is_some_and(|capacity| self.records.len() >= capacity)
    }

    /// Validates and appends a new record.
    ///
    /// The table is unchanged when this returns an error.
    pub fn insert(&mut self, record: R) -> Result<()> {
        record.validate()?;

        let key = record.key();
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey {
                collection: R::KIND,
                key,
            });
        }

        if let Some(capacity) = self.capacity.filter(|_| self.is_full()) {
            return Err(Error::CapacityExceeded {
                collection: R::KIND,
                capacity,
            });
        }

        self.push(record);
        Ok(())
    }

    /// Retrieves a record by key
    pub fn get(&self, key: u64) -> Option<&R> {
        self.index.get(&key).map(|&pos| &self.records[pos])
    }

    /// Returns true if a record with this key exists
    pub fn contains(&self, key: u64) -> bool {
        self.index.contains_key(&key)
    }

    /// Runs `f` against the record with this key.
    ///
    /// `f` must not change the record's key.
    pub fn modify<T>(&mut self, key: u64, f: impl FnOnce(&mut R) -> T) -> Result<T> {
        let pos = *self.index.get(&key).ok_or(Error::NotFound {
            collection: R::KIND,
            key,
        })?;

        let record = &mut self.records[pos];
        let out = f(&mut *record);
        debug_assert_eq!(record.key(), key, "record key changed in place");
        Ok(out)
    }

    /// Applies a partial patch to the record with this key
    pub fn update(&mut self, key: u64, patch: R::Patch) -> Result<UpdateReport>
    where
        R: Patchable,
    {
        self.modify(key, |record| record.apply_patch(patch))
    }

    /// Removes a record, keeping the relative order of the rest
    pub fn remove(&mut self, key: u64) -> Result<R> {
        let pos = self.index.remove(&key).ok_or(Error::NotFound {
            collection: R::KIND,
            key,
        })?;

        let removed = self.records.remove(pos);
        for record in &self.records[pos..] {
            if let Some(slot) = self.index.get_mut(&record.key()) {
                *slot -= 1;
            }
        }

        Ok(removed)
    }

    /// Case-insensitive substring search over one text field.
    ///
    /// Returns an empty vector when nothing matches.
    pub fn search(&self, field: R::Field, needle: &str) -> Vec<R>
    where
        R: Searchable,
    {
        let needle = needle.to_lowercase();
        self.records
            .iter()
            .filter(|record| record.text(field).to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Largest key in the table
    pub fn max_key(&self) -> Option<u64> {
        self.index.keys().copied().max()
    }

    /// Records in insertion order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Iterator over records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.iter()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Configured ceiling, if any
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelflite_core::{Book, BookField, BookPatch, Money, Sale};

    fn book(isbn: u64, title: &str) -> Book {
        Book::new(isbn, title, "Some Author", Money::from_cents(1000), 5)
    }

    fn isbns(table: &Table<Book>) -> Vec<u64> {
        table.iter().map(|b| b.isbn).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = Table::new(None);
        table.insert(book(1, "Dune")).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().title, "Dune");
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_duplicate_key_leaves_table_unchanged() {
        let mut table = Table::new(None);
        table.insert(book(1, "Dune")).unwrap();

        let err = table.insert(book(1, "Emma")).unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { collection: "books", key: 1 }));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().title, "Dune");
    }

    #[test]
    fn test_invalid_record_rejected() {
        let mut table = Table::new(None);
        let err = table.insert(book(1, "")).unwrap_err();

        assert!(matches!(err, Error::ValidationFailed { field: "title", .. }));
        assert!(table.is_empty());
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut table = Table::new(Some(2));
        table.insert(book(1, "A")).unwrap();
        table.insert(book(2, "B")).unwrap();

        let err = table.insert(book(3, "C")).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { capacity: 2, .. }));
        assert_eq!(table.len(), 2);

        // Removing frees a slot
        table.remove(1).unwrap();
        table.insert(book(3, "C")).unwrap();
        assert_eq!(isbns(&table), vec![2, 3]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut table = Table::new(None);
        for isbn in [10, 20, 30, 40, 50] {
            table.insert(book(isbn, "T")).unwrap();
        }

        let removed = table.remove(20).unwrap();
        assert_eq!(removed.isbn, 20);
        assert_eq!(isbns(&table), vec![10, 30, 40, 50]);

        // Index positions follow the shifted records
        assert_eq!(table.get(40).unwrap().isbn, 40);
        assert_eq!(table.get(50).unwrap().isbn, 50);
        table.remove(50).unwrap();
        assert_eq!(isbns(&table), vec![10, 30, 40]);
    }

    #[test]
    fn test_remove_missing_key() {
        let mut table = Table::new(None);
        table.insert(book(1, "A")).unwrap();

        let err = table.remove(99).unwrap_err();
        assert!(matches!(err, Error::NotFound { key: 99, .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_update_missing_key() {
        let mut table: Table<Book> = Table::new(None);
        let err = table.update(5, BookPatch::new().title("X")).unwrap_err();
        assert!(matches!(err, Error::NotFound { key: 5, .. }));
    }

    #[test]
    fn test_update_applies_valid_fields() {
        let mut table = Table::new(None);
        table.insert(book(1, "Dune")).unwrap();

        let report = table
            .update(1, BookPatch::new().title("").author("Herbert"))
            .unwrap();
        assert_eq!(report.applied, vec!["author"]);
        assert_eq!(report.rejected[0].field, "title");

        let stored = table.get(1).unwrap();
        assert_eq!(stored.title, "Dune");
        assert_eq!(stored.author, "Herbert");
    }

    #[test]
    fn test_search_case_insensitive() {
        let mut table = Table::new(None);
        table.insert(book(1, "The Rust Book")).unwrap();
        table.insert(book(2, "Programming Rust")).unwrap();
        table.insert(book(3, "Dune")).unwrap();

        let hits = table.search(BookField::Title, "rUsT");
        assert_eq!(hits.iter().map(|b| b.isbn).collect::<Vec<_>>(), vec![1, 2]);

        assert!(table.search(BookField::Title, "cobol").is_empty());
    }

    #[test]
    fn test_from_records_skips_duplicates_and_truncates() {
        let records = vec![book(1, "A"), book(2, "B"), book(1, "C"), book(3, "D")];
        let table = Table::from_records(records.clone(), None);
        assert_eq!(isbns(&table), vec![1, 2, 3]);
        assert_eq!(table.get(1).unwrap().title, "A");

        let table = Table::from_records(records, Some(2));
        assert_eq!(isbns(&table), vec![1, 2]);
    }

    #[test]
    fn test_max_key() {
        let mut table: Table<Sale> = Table::new(None);
        assert_eq!(table.max_key(), None);

        for sale_id in [3, 7, 5] {
            table
                .insert(Sale {
                    sale_id,
                    customer_id: 1,
                    isbn: 1,
                    quantity: 1,
                    total_price: Money::from_cents(100),
                })
                .unwrap();
        }
        assert_eq!(table.max_key(), Some(7));
    }
}
