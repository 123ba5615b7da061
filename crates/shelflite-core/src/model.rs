//! Record model: books, customers, sales and the money type they share.

use crate::error::Result;
use crate::record::{Patchable, Record, Searchable, UpdateReport};
use crate::validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// A non-negative amount of money stored as integer cents.
///
/// Cents keep `quantity x price` exact, so a sale of two books at 10.00
/// is always 20.00.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero
    pub const ZERO: Money = Money(0);

    /// Creates an amount from a number of cents
    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    /// Returns the amount in cents
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Returns true if the amount is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Multiplies by a unit count, returning `None` on overflow
    pub fn checked_mul(self, units: u32) -> Option<Money> {
        self.0.checked_mul(u64::from(units)).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

/// Saturates at `u64::MAX` cents.
impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A book in the catalog, keyed by ISBN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique key
    pub isbn: u64,
    /// Title (1-99 characters)
    pub title: String,
    /// Author (1-49 characters)
    pub author: String,
    /// Unit price, strictly positive
    pub price: Money,
    /// Copies in stock
    pub quantity: u32,
}

impl Book {
    /// Creates a new book record
    pub fn new(
        isbn: u64,
        title: impl Into<String>,
        author: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            isbn,
            title: title.into(),
            author: author.into(),
            price,
            quantity,
        }
    }
}

/// Text fields of a [`Book`] that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    /// Book title
    Title,
    /// Book author
    Author,
}

/// Partial edit of a [`Book`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    /// New title
    pub title: Option<String>,
    /// New author
    pub author: Option<String>,
    /// New price
    pub price: Option<Money>,
    /// New stock quantity
    pub quantity: Option<u32>,
}

impl BookPatch {
    /// Creates an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a new author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set a new price
    pub fn price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    /// Set a new stock quantity
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

impl Record for Book {
    const KIND: &'static str = "books";

    fn key(&self) -> u64 {
        self.isbn
    }

    fn validate(&self) -> Result<()> {
        validate::validate_title(&self.title)?;
        validate::validate_author(&self.author)?;
        validate::validate_price(self.price)
    }
}

impl Patchable for Book {
    type Patch = BookPatch;

    fn apply_patch(&mut self, patch: BookPatch) -> UpdateReport {
        let mut report = UpdateReport::default();
        report.apply("title", &mut self.title, patch.title, |t| {
            validate::validate_title(t)
        });
        report.apply("author", &mut self.author, patch.author, |a| {
            validate::validate_author(a)
        });
        report.apply("price", &mut self.price, patch.price, |p| {
            validate::validate_price(*p)
        });
        report.apply("quantity", &mut self.quantity, patch.quantity, |_| Ok(()));
        report
    }
}

impl Searchable for Book {
    type Field = BookField;

    fn text(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
        }
    }
}

/// A registered customer, keyed by a caller-supplied positive ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique key, positive
    pub customer_id: u64,
    /// Letters and spaces only
    pub name: String,
    /// Exactly ten digits
    pub phone: String,
}

impl Customer {
    /// Creates a new customer record
    pub fn new(customer_id: u64, name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            customer_id,
            name: name.into(),
            phone: phone.into(),
        }
    }
}

/// Text fields of a [`Customer`] that can be searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerField {
    /// Customer name
    Name,
    /// Customer phone number
    Phone,
}

/// Partial edit of a [`Customer`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    /// New name
    pub name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
}

impl CustomerPatch {
    /// Creates an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a new phone number
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

impl Record for Customer {
    const KIND: &'static str = "customers";

    fn key(&self) -> u64 {
        self.customer_id
    }

    fn validate(&self) -> Result<()> {
        validate::validate_customer_id(self.customer_id)?;
        validate::validate_name(&self.name)?;
        validate::validate_phone(&self.phone)
    }
}

impl Patchable for Customer {
    type Patch = CustomerPatch;

    fn apply_patch(&mut self, patch: CustomerPatch) -> UpdateReport {
        let mut report = UpdateReport::default();
        report.apply("name", &mut self.name, patch.name, |n| {
            validate::validate_name(n)
        });
        report.apply("phone", &mut self.phone, patch.phone, |p| {
            validate::validate_phone(p)
        });
        report
    }
}

impl Searchable for Customer {
    type Field = CustomerField;

    fn text(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::Name => &self.name,
            CustomerField::Phone => &self.phone,
        }
    }
}

/// A completed sale. Sales are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Sequential key, starting at 1
    pub sale_id: u64,
    /// Buying customer
    pub customer_id: u64,
    /// Book sold
    pub isbn: u64,
    /// Copies sold, positive
    pub quantity: u32,
    /// `quantity x price` at the time of sale
    pub total_price: Money,
}

impl Record for Sale {
    const KIND: &'static str = "sales";

    fn key(&self) -> u64 {
        self.sale_id
    }

    fn validate(&self) -> Result<()> {
        validate::validate_sale_quantity(self.quantity)
    }
}
