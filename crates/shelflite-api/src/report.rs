//! Sales report across all three collections

use crate::Bookstore;
use shelflite_core::{Money, Result, Sale};
use std::collections::HashMap;

/// Sales of one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSales {
    /// Book ISBN
    pub isbn: u64,
    /// Book title at report time
    pub title: String,
    /// Sum of quantities over the book's sales
    pub copies_sold: u64,
    /// Sum of totals over the book's sales
    pub revenue: Money,
}

/// Purchases of one customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSales {
    /// Customer ID
    pub customer_id: u64,
    /// Customer name at report time
    pub name: String,
    /// Number of sales
    pub purchases: usize,
    /// Sum of totals over the customer's sales
    pub total_spent: Money,
}

/// Snapshot of all sales, grouped by book and by customer.
///
/// Groups follow the order of the book and customer collections and only
/// include entries with at least one sale. A sale whose book or customer
/// no longer exists still counts toward `total_revenue` and is listed in
/// `unmatched_sales`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesReport {
    /// Every sale in the order it was made
    pub sales: Vec<Sale>,
    /// Sum of all sale totals
    pub total_revenue: Money,
    /// Per-book totals
    pub by_book: Vec<BookSales>,
    /// Per-customer totals
    pub by_customer: Vec<CustomerSales>,
    /// IDs of sales referencing a missing book or customer
    pub unmatched_sales: Vec<u64>,
}

#[derive(Default)]
struct Tally {
    count: usize,
    quantity: u64,
    total: Money,
}

impl Tally {
    fn add(&mut self, sale: &Sale) {
        self.count += 1;
        self.quantity += u64::from(sale.quantity);
        self.total = self.total + sale.total_price;
    }
}

impl Bookstore {
    /// Builds a sales report from one consistent view of the store
    pub fn sales_report(&self) -> Result<SalesReport> {
        let books = self.inner.books.read()?;
        let customers = self.inner.customers.read()?;
        let sales = self.inner.sales.read()?;

        let mut per_book: HashMap<u64, Tally> = HashMap::new();
        let mut per_customer: HashMap<u64, Tally> = HashMap::new();
        let mut unmatched_sales = Vec::new();

        for sale in sales.iter() {
            per_book.entry(sale.isbn).or_default().add(sale);
            per_customer.entry(sale.customer_id).or_default().add(sale);

            if !books.contains(sale.isbn) || !customers.contains(sale.customer_id) {
                unmatched_sales.push(sale.sale_id);
            }
        }

        let by_book = books
            .iter()
            .filter_map(|book| {
                per_book.get(&book.isbn).map(|tally| BookSales {
                    isbn: book.isbn,
                    title: book.title.clone(),
                    copies_sold: tally.quantity,
                    revenue: tally.total,
                })
            })
            .collect();

        let by_customer = customers
            .iter()
            .filter_map(|customer| {
                per_customer
                    .get(&customer.customer_id)
                    .map(|tally| CustomerSales {
                        customer_id: customer.customer_id,
                        name: customer.name.clone(),
                        purchases: tally.count,
                        total_spent: tally.total,
                    })
            })
            .collect();

        Ok(SalesReport {
            sales: sales.records().to_vec(),
            total_revenue: sales.iter().map(|sale| sale.total_price).sum(),
            by_book,
            by_customer,
            unmatched_sales,
        })
    }
}
