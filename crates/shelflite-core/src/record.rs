//! Record traits shared by every collection.
//!
//! A collection is generic over [`Record`]; editing and text search are
//! opt-in through [`Patchable`] and [`Searchable`], so append-only
//! records such as sales simply do not implement them.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// A record stored in a keyed collection
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, used in errors, logs and file names
    const KIND: &'static str;

    /// The unique key of this record
    fn key(&self) -> u64;

    /// Checks every field constraint of a record about to be created
    fn validate(&self) -> Result<()>;
}

/// A record that can be edited in place with a partial patch
pub trait Patchable: Record {
    /// Partial field set; unset fields keep their current value
    type Patch;

    /// Applies each supplied field that passes validation.
    ///
    /// A rejected field never blocks the others.
    fn apply_patch(&mut self, patch: Self::Patch) -> UpdateReport;
}

/// A record with text fields that support substring search
pub trait Searchable: Record {
    /// Identifies one text field
    type Field: Copy + Debug;

    /// Returns the text of the given field
    fn text(&self, field: Self::Field) -> &str;
}

/// A field that was supplied in a patch but failed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name
    pub field: &'static str,
    /// Why the value was rejected
    pub reason: String,
}

/// Outcome of a partial update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Fields that were changed
    pub applied: Vec<&'static str>,
    /// Fields that were supplied but rejected
    pub rejected: Vec<FieldError>,
}

impl UpdateReport {
    /// True when no supplied field was rejected
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Applies `value` to `slot` if present and valid, recording the outcome.
    pub fn apply<T>(
        &mut self,
        field: &'static str,
        slot: &mut T,
        value: Option<T>,
        check: impl FnOnce(&T) -> Result<()>,
    ) {
        let Some(value) = value else {
            return;
        };

        match check(&value) {
            Ok(()) => {
                *slot = value;
                self.applied.push(field);
            }
            Err(Error::ValidationFailed { reason, .. }) => {
                self.rejected.push(FieldError { field, reason });
            }
            Err(other) => {
                self.rejected.push(FieldError {
                    field,
                    reason: other.to_string(),
                });
            }
        }
    }
}
