// Common test utilities for store integration tests

use shelflite::{Book, Bookstore, Customer, Money, ReferentialPolicy, StoreConfig, SyncMode};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture owning a temporary store directory
pub struct StoreFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub store_path: PathBuf,
}

impl StoreFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store_path = temp_dir.path().join("shop");

        Self {
            temp_dir,
            store_path,
        }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// Opens (or reopens) the store with fast, unsynced saves
    pub fn open(&self) -> Bookstore {
        self.open_with(StoreConfig::default())
    }

    #[allow(dead_code)]
    pub fn open_enforcing(&self) -> Bookstore {
        self.open_with(StoreConfig::default().with_referential_policy(ReferentialPolicy::Enforce))
    }

    pub fn open_with(&self, config: StoreConfig) -> Bookstore {
        Bookstore::open_with_config(&self.store_path, config.with_sync_mode(SyncMode::None))
            .expect("Failed to open store")
    }

    #[allow(dead_code)]
    pub fn file(&self, name: &str) -> PathBuf {
        self.store_path.join(name)
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn book(isbn: u64, title: &str, price_cents: u64, quantity: u32) -> Book {
    Book::new(isbn, title, "Test Author", Money::from_cents(price_cents), quantity)
}

#[allow(dead_code)]
pub fn customer(customer_id: u64, name: &str) -> Customer {
    Customer::new(customer_id, name, "5551234567")
}
