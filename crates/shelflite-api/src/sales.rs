//! Sale processing: the one mutation that spans collections.
//!
//! A sale checks stock, decrements it, and appends the sale record while
//! holding the book and sale write locks (and the customer read lock when
//! customers are enforced). No other writer can observe or change the
//! book between the stock check and the decrement, so two concurrent
//! sales can never oversell.
//!
//! The book file is saved before the sale file. If the second save fails
//! the decremented stock stays on disk without its sale; the error is
//! returned and [`Bookstore::sync`] can rewrite the sale file later.

use crate::{Bookstore, ReferentialPolicy};
use shelflite_core::validate::validate_sale_quantity;
use shelflite_core::{Error, Record, Result, Sale};
use tracing::info;

impl Bookstore {
    /// Sells `quantity` copies of book `isbn` to `customer_id`.
    ///
    /// Returns the recorded sale, whose ID is one more than the largest
    /// existing sale ID (1 for the first sale). Fails with
    /// `BookNotFound`, `InsufficientStock`, or `CustomerNotFound` under
    /// [`ReferentialPolicy::Enforce`], leaving every collection unchanged.
    pub fn process_sale(&self, customer_id: u64, isbn: u64, quantity: u32) -> Result<Sale> {
        validate_sale_quantity(quantity)?;

        let inner = &self.inner;
        let mut books = inner.books.write()?;
        let customers = match inner.policy {
            ReferentialPolicy::Enforce => Some(inner.customers.read()?),
            ReferentialPolicy::Permissive => None,
        };
        let mut sales = inner.sales.write()?;

        let book = books.get(isbn).ok_or(Error::BookNotFound(isbn))?;

        if let Some(customers) = &customers {
            if !customers.contains(customer_id) {
                return Err(Error::CustomerNotFound(customer_id));
            }
        }

        if quantity > book.quantity {
            return Err(Error::InsufficientStock {
                isbn,
                requested: quantity,
                available: book.quantity,
            });
        }

        let total_price = book
            .price
            .checked_mul(quantity)
            .ok_or_else(|| Error::validation("quantity", "total price overflows"))?;

        if let Some(capacity) = sales.capacity().filter(|_| sales.is_full()) {
            return Err(Error::CapacityExceeded {
                collection: Sale::KIND,
                capacity,
            });
        }

        let sale_id = match sales.max_key() {
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| Error::validation("sale_id", "sale id space exhausted"))?,
            None => 1,
        };

        let sale = Sale {
            sale_id,
            customer_id,
            isbn,
            quantity,
            total_price,
        };

        let remaining = books.modify(isbn, |book| {
            book.quantity -= quantity;
            book.quantity
        })?;
        books.persist()?;

        sales.insert(sale.clone())?;
        sales.persist()?;

        info!(
            sale_id = sale.sale_id,
            customer_id,
            isbn,
            quantity,
            total = %sale.total_price,
            remaining,
            "sale processed"
        );

        Ok(sale)
    }
}
