//! # ShelfLite
//!
//! A concurrent, file-backed record store for a small bookstore: books,
//! customers and the sales between them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shelflite::{Book, Bookstore, Customer, Money};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Bookstore::open("./shop_data")?;
//!
//!     store.add_book(Book::new(1234, "Dune", "Frank Herbert", Money::from_cents(1000), 5))?;
//!     store.add_customer(Customer::new(7, "Ada Lovelace", "5551234567"))?;
//!
//!     let sale = store.process_sale(7, 1234, 2)?;
//!     println!("sale #{} total {}", sale.sale_id, sale.total_price);
//!
//!     // Every mutation is already on disk
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! [`Bookstore`] is cheap to clone and safe to share across threads. Each
//! collection has its own lock; operations that touch several collections
//! (sales, the sales report, referential checks) take the locks they need
//! in one fixed order: books, then customers, then sales.

use shelflite_core::Record;
use shelflite_storage::Collection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub mod logging;
pub mod report;
pub mod sales;

// Re-export core types
pub use shelflite_core::{
    Book, BookField, BookPatch, Customer, CustomerField, CustomerPatch, Error, FieldError, Money,
    Result, Sale, UpdateReport,
};

// Storage components
pub use shelflite_storage::{StorageConfig, SyncMode};

pub use report::{BookSales, CustomerSales, SalesReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How sales relate to the books and customers they reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReferentialPolicy {
    /// Sales may name unknown customers, and books or customers with sales
    /// may be deleted, leaving dangling references
    #[default]
    Permissive,
    /// Sales require an existing customer, and referenced books or
    /// customers cannot be deleted
    Enforce,
}

/// Store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Book collection storage
    pub books: StorageConfig,
    /// Customer collection storage
    pub customers: StorageConfig,
    /// Sale collection storage
    pub sales: StorageConfig,
    /// Referential integrity between sales and the other collections
    pub referential_policy: ReferentialPolicy,
}

impl StoreConfig {
    /// Cap every collection at `capacity` records
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.books.capacity = Some(capacity);
        self.customers.capacity = Some(capacity);
        self.sales.capacity = Some(capacity);
        self
    }

    /// Set the sync mode of every collection
    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.books.sync_mode = sync_mode;
        self.customers.sync_mode = sync_mode;
        self.sales.sync_mode = sync_mode;
        self
    }

    /// Set the referential policy
    pub fn with_referential_policy(mut self, policy: ReferentialPolicy) -> Self {
        self.referential_policy = policy;
        self
    }
}

/// Live record counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    /// Number of books
    pub books: usize,
    /// Number of customers
    pub customers: usize,
    /// Number of sales
    pub sales: usize,
}

struct StoreInner {
    dir: PathBuf,
    books: Collection<Book>,
    customers: Collection<Customer>,
    sales: Collection<Sale>,
    policy: ReferentialPolicy,
}

/// The main store handle.
///
/// Thread-safe and can be cloned to share across threads.
///
/// # Examples
///
/// ```rust,no_run
/// use shelflite::{Book, Bookstore, Money};
///
/// let store = Bookstore::open("./shop_data")?;
/// store.add_book(Book::new(1, "Emma", "Jane Austen", Money::from_cents(850), 3))?;
///
/// // Data persists across restarts
/// drop(store);
/// let store = Bookstore::open("./shop_data")?;
/// assert_eq!(store.get_book(1)?.map(|b| b.quantity), Some(3));
/// # Ok::<(), shelflite::Error>(())
/// ```
#[derive(Clone)]
pub struct Bookstore {
    inner: Arc<StoreInner>,
}

impl Bookstore {
    /// Opens the store kept in `path`, creating the directory if needed.
    ///
    /// Collection files that are missing or damaged load as empty
    /// collections; the problem is logged and opening still succeeds.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Opens the store with custom configuration
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: StoreConfig) -> Result<Self> {
        let dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let books = Collection::open(&dir, &config.books);
        let customers = Collection::open(&dir, &config.customers);
        let sales = Collection::open(&dir, &config.sales);

        let store = Bookstore {
            inner: Arc::new(StoreInner {
                dir,
                books,
                customers,
                sales,
                policy: config.referential_policy,
            }),
        };

        let counts = store.counts()?;
        info!(
            path = %store.inner.dir.display(),
            books = counts.books,
            customers = counts.customers,
            sales = counts.sales,
            policy = ?store.inner.policy,
            "Opening ShelfLite store"
        );

        Ok(store)
    }

    /// Directory holding the collection files
    pub fn path(&self) -> &Path {
        &self.inner.dir
    }

    /// Referential policy in effect
    pub fn referential_policy(&self) -> ReferentialPolicy {
        self.inner.policy
    }

    // Books

    /// Adds a new book.
    ///
    /// Fails with `ValidationFailed`, `DuplicateKey` or `CapacityExceeded`
    /// without changing the collection.
    pub fn add_book(&self, book: Book) -> Result<()> {
        self.inner.books.insert(book)
    }

    /// Edits a book. Only the fields set in `patch` are touched.
    ///
    /// Fields that fail validation are listed in the returned report and
    /// the remaining fields are still applied.
    pub fn edit_book(&self, isbn: u64, patch: BookPatch) -> Result<UpdateReport> {
        self.inner.books.update(isbn, patch)
    }

    /// Deletes a book, keeping the order of the remaining books
    pub fn delete_book(&self, isbn: u64) -> Result<Book> {
        match self.inner.policy {
            ReferentialPolicy::Permissive => self.inner.books.remove(isbn),
            ReferentialPolicy::Enforce => {
                let mut books = self.inner.books.write()?;
                let sales = self.inner.sales.read()?;

                if !books.contains(isbn) {
                    return Err(Error::NotFound {
                        collection: Book::KIND,
                        key: isbn,
                    });
                }

                let referencing = sales.iter().filter(|s| s.isbn == isbn).count();
                if referencing > 0 {
                    return Err(Error::Referenced {
                        collection: Book::KIND,
                        key: isbn,
                        sales: referencing,
                    });
                }

                let removed = books.remove(isbn)?;
                debug!(isbn, "book deleted");
                books.persist()?;
                Ok(removed)
            }
        }
    }

    /// Looks up a book by ISBN
    pub fn get_book(&self, isbn: u64) -> Result<Option<Book>> {
        self.inner.books.get(isbn)
    }

    /// Books whose `field` contains `needle`, ignoring case
    pub fn search_books(&self, field: BookField, needle: &str) -> Result<Vec<Book>> {
        self.inner.books.search(field, needle)
    }

    /// All books in insertion order
    pub fn list_books(&self) -> Result<Vec<Book>> {
        self.inner.books.list()
    }

    // Customers

    /// Adds a new customer.
    ///
    /// Fails with `ValidationFailed`, `DuplicateKey` or `CapacityExceeded`
    /// without changing the collection.
    pub fn add_customer(&self, customer: Customer) -> Result<()> {
        self.inner.customers.insert(customer)
    }

    /// Edits a customer. Only the fields set in `patch` are touched.
    pub fn edit_customer(&self, customer_id: u64, patch: CustomerPatch) -> Result<UpdateReport> {
        self.inner.customers.update(customer_id, patch)
    }

    /// Deletes a customer, keeping the order of the remaining customers
    pub fn delete_customer(&self, customer_id: u64) -> Result<Customer> {
        match self.inner.policy {
            ReferentialPolicy::Permissive => self.inner.customers.remove(customer_id),
            ReferentialPolicy::Enforce => {
                let mut customers = self.inner.customers.write()?;
                let sales = self.inner.sales.read()?;

                if !customers.contains(customer_id) {
                    return Err(Error::NotFound {
                        collection: Customer::KIND,
                        key: customer_id,
                    });
                }

                let referencing = sales
                    .iter()
                    .filter(|s| s.customer_id == customer_id)
                    .count();
                if referencing > 0 {
                    return Err(Error::Referenced {
                        collection: Customer::KIND,
                        key: customer_id,
                        sales: referencing,
                    });
                }

                let removed = customers.remove(customer_id)?;
                debug!(customer_id, "customer deleted");
                customers.persist()?;
                Ok(removed)
            }
        }
    }

    /// Looks up a customer by ID
    pub fn get_customer(&self, customer_id: u64) -> Result<Option<Customer>> {
        self.inner.customers.get(customer_id)
    }

    /// Customers whose `field` contains `needle`, ignoring case
    pub fn search_customers(&self, field: CustomerField, needle: &str) -> Result<Vec<Customer>> {
        self.inner.customers.search(field, needle)
    }

    /// All customers in insertion order
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        self.inner.customers.list()
    }

    // Sales

    /// Looks up a sale by ID
    pub fn get_sale(&self, sale_id: u64) -> Result<Option<Sale>> {
        self.inner.sales.get(sale_id)
    }

    /// All sales in the order they were made
    pub fn list_sales(&self) -> Result<Vec<Sale>> {
        self.inner.sales.list()
    }

    // Whole store

    /// Record counts taken from one consistent view of all collections
    pub fn counts(&self) -> Result<StoreCounts> {
        let books = self.inner.books.read()?;
        let customers = self.inner.customers.read()?;
        let sales = self.inner.sales.read()?;

        Ok(StoreCounts {
            books: books.len(),
            customers: customers.len(),
            sales: sales.len(),
        })
    }

    /// Rewrites every collection file from memory.
    ///
    /// Mutations already persist themselves; this repairs the files after
    /// an earlier I/O error left them behind the in-memory state. Each
    /// collection is flushed under its own lock in turn, so the three files
    /// are not written as one snapshot: a sale landing between two flushes
    /// can appear in `books.db` before it appears in `sales.db`.
    pub fn sync(&self) -> Result<()> {
        self.inner.books.flush()?;
        self.inner.customers.flush()?;
        self.inner.sales.flush()
    }
}
