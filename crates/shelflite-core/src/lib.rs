//! # ShelfLite Core
//!
//! Core types for the ShelfLite record store: the error taxonomy, the
//! book/customer/sale record model and the traits that collections are
//! generic over.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! Users should depend on the main `shelflite` crate instead, which
//! re-exports everything needed from here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format_version;
pub mod model;
pub mod record;
pub mod validate;

pub use error::{Error, Result};
pub use model::{
    Book, BookField, BookPatch, Customer, CustomerField, CustomerPatch, Money, Sale,
};
pub use record::{FieldError, Patchable, Record, Searchable, UpdateReport};
