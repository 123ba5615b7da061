//! Field validation for records entering the store
//!
//! Every check here runs on create and on edit. Records read back from
//! disk are trusted as-is and never pass through these functions.

use crate::error::{Error, Result};
use crate::model::Money;

/// Maximum title length in characters
pub const MAX_TITLE_LENGTH: usize = 99;

/// Maximum author length in characters
pub const MAX_AUTHOR_LENGTH: usize = 49;

/// Maximum customer name length in characters
pub const MAX_NAME_LENGTH: usize = 49;

/// Exact number of digits in a phone number
pub const PHONE_LENGTH: usize = 10;

fn bounded_text(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "cannot be empty"));
    }

    let len = value.chars().count();
    if len > max {
        return Err(Error::validation(
            field,
            format!("length {} exceeds maximum {}", len, max),
        ));
    }

    if value.chars().any(char::is_control) {
        return Err(Error::validation(field, "cannot contain control characters"));
    }

    Ok(())
}

/// Validates a book title
#[inline]
pub fn validate_title(title: &str) -> Result<()> {
    bounded_text("title", title, MAX_TITLE_LENGTH)
}

/// Validates a book author
#[inline]
pub fn validate_author(author: &str) -> Result<()> {
    bounded_text("author", author, MAX_AUTHOR_LENGTH)
}

/// Validates a book price, which must be strictly positive
#[inline]
pub fn validate_price(price: Money) -> Result<()> {
    if price.is_zero() {
        return Err(Error::validation("price", "must be greater than zero"));
    }
    Ok(())
}

/// Validates a caller-supplied customer ID
#[inline]
pub fn validate_customer_id(id: u64) -> Result<()> {
    if id == 0 {
        return Err(Error::validation("customer_id", "must be a positive integer"));
    }
    Ok(())
}

/// Validates a customer name: letters and spaces only
pub fn validate_name(name: &str) -> Result<()> {
    bounded_text("name", name, MAX_NAME_LENGTH)?;

    if !name.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') {
        return Err(Error::validation("name", "only letters and spaces are allowed"));
    }

    Ok(())
}

/// Validates a phone number: exactly [`PHONE_LENGTH`] ASCII digits
pub fn validate_phone(phone: &str) -> Result<()> {
    if phone.len() != PHONE_LENGTH || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(
            "phone",
            format!("must be exactly {} digits", PHONE_LENGTH),
        ));
    }
    Ok(())
}

/// Validates the quantity of a sale, which must be positive
#[inline]
pub fn validate_sale_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(Error::validation("quantity", "must be greater than zero"));
    }
    Ok(())
}
