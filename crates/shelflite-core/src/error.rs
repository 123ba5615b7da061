//! Error types for ShelfLite.

use thiserror::Error;

/// The main error type for ShelfLite operations.
///
/// Validation and lookup failures are ordinary values returned to the
/// caller; nothing in the store panics on bad input.
#[derive(Debug, Error)]
pub enum Error {
    /// A record with the same key already exists in the collection
    #[error("{collection}: key {key} already exists")]
    DuplicateKey {
        /// Collection name
        collection: &'static str,
        /// Offending key
        key: u64,
    },

    /// No record with the given key exists in the collection
    #[error("{collection}: key {key} not found")]
    NotFound {
        /// Collection name
        collection: &'static str,
        /// Missing key
        key: u64,
    },

    /// The collection reached its configured maximum size
    #[error("{collection}: capacity of {capacity} records reached")]
    CapacityExceeded {
        /// Collection name
        collection: &'static str,
        /// Configured ceiling
        capacity: usize,
    },

    /// A field value failed validation
    #[error("invalid {field}: {reason}")]
    ValidationFailed {
        /// Field name
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },

    /// A sale asked for more copies than are in stock
    #[error("insufficient stock for ISBN {isbn}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Book being sold
        isbn: u64,
        /// Quantity requested
        requested: u32,
        /// Quantity on hand
        available: u32,
    },

    /// A sale referenced a book that does not exist
    #[error("book with ISBN {0} not found")]
    BookNotFound(u64),

    /// A sale referenced a customer that does not exist
    #[error("customer {0} not found")]
    CustomerNotFound(u64),

    /// A delete was refused because sales still reference the record
    #[error("{collection}: key {key} is referenced by {sales} sale(s)")]
    Referenced {
        /// Collection name
        collection: &'static str,
        /// Key of the record that was not deleted
        key: u64,
        /// Number of referencing sales
        sales: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persisted collection failed an integrity check
    #[error("Data corruption: {0}")]
    Corruption(String),

    /// A lock was poisoned (internal error)
    #[error("Lock poisoned")]
    LockPoisoned,
}

impl Error {
    /// Shorthand for a [`Error::ValidationFailed`] value.
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Error::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised by the persistence layer.
    ///
    /// When one of these is returned from a mutation, the in-memory change
    /// has already been applied.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Serialization(_) | Error::Corruption(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ShelfLite operations.
pub type Result<T> = std::result::Result<T, Error>;
