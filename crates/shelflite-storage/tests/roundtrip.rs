// Integration tests for collection files: boundary records and reload behavior

mod common;

use common::StorageTestFixture;
use shelflite_core::validate::{MAX_AUTHOR_LENGTH, MAX_NAME_LENGTH, MAX_TITLE_LENGTH};
use shelflite_core::{Book, Customer, Money, Sale};
use shelflite_storage::{Collection, FlatFile, StorageConfig, SyncMode};

fn boundary_books() -> Vec<Book> {
    vec![
        Book::new(1, "A", "B", Money::from_cents(1), 0),
        Book::new(
            u64::MAX,
            "T".repeat(MAX_TITLE_LENGTH),
            "W".repeat(MAX_AUTHOR_LENGTH),
            Money::from_cents(u64::MAX),
            u32::MAX,
        ),
        Book::new(42, "Cien años de soledad", "García Márquez", Money::from_cents(1999), 3),
        Book::new(7, "Quotes \"and\" \\ slashes", "O'Brien", Money::from_cents(500), 1),
    ]
}

#[test]
fn test_boundary_books_roundtrip() {
    let fixture = StorageTestFixture::new();
    let file = FlatFile::for_collection::<Book>(fixture.data_dir(), SyncMode::Sync);

    file.save(&boundary_books()).unwrap();
    assert_eq!(file.try_load::<Book>().unwrap(), boundary_books());
}

#[test]
fn test_boundary_customers_roundtrip() {
    let fixture = StorageTestFixture::new();
    let file = FlatFile::for_collection::<Customer>(fixture.data_dir(), SyncMode::None);
    let customers = vec![
        Customer::new(1, "A", "0000000000"),
        Customer::new(u64::MAX, "Z".repeat(MAX_NAME_LENGTH), "9999999999"),
    ];

    file.save(&customers).unwrap();
    assert_eq!(file.try_load::<Customer>().unwrap(), customers);
}

#[test]
fn test_sales_roundtrip_keeps_order() {
    let fixture = StorageTestFixture::new();
    let file = FlatFile::for_collection::<Sale>(fixture.data_dir(), SyncMode::None);
    let sales: Vec<Sale> = [3u64, 1, 2]
        .into_iter()
        .map(|sale_id| Sale {
            sale_id,
            customer_id: sale_id * 10,
            isbn: 1234,
            quantity: sale_id as u32,
            total_price: Money::from_cents(sale_id * 1000),
        })
        .collect();

    file.save(&sales).unwrap();
    assert_eq!(file.try_load::<Sale>().unwrap(), sales);
}

#[test]
fn test_collection_reload_through_open() {
    let fixture = StorageTestFixture::new();
    {
        let books = Collection::<Book>::open(fixture.data_dir(), &fixture.config());
        for book in boundary_books() {
            books.insert(book).unwrap();
        }
    }

    let books = Collection::<Book>::open(fixture.data_dir(), &fixture.config());
    assert_eq!(books.list().unwrap(), boundary_books());
    assert_eq!(books.get(u64::MAX).unwrap().unwrap().quantity, u32::MAX);
}

#[test]
fn test_load_does_not_revalidate() {
    let fixture = StorageTestFixture::new();
    let file = FlatFile::for_collection::<Customer>(fixture.data_dir(), SyncMode::None);

    // Would be rejected on create, but loads as stored
    file.save(&[Customer::new(0, "R2D2", "12")]).unwrap();

    let customers = Collection::<Customer>::open(fixture.data_dir(), &fixture.config());
    assert_eq!(customers.len().unwrap(), 1);
    assert_eq!(customers.get(0).unwrap().unwrap().name, "R2D2");
}

#[test]
fn test_duplicate_keys_on_disk_are_skipped() {
    let fixture = StorageTestFixture::new();
    let file = FlatFile::for_collection::<Book>(fixture.data_dir(), SyncMode::None);
    file.save(&[
        Book::new(1, "First", "A", Money::from_cents(100), 1),
        Book::new(2, "Second", "B", Money::from_cents(100), 1),
        Book::new(1, "Again", "C", Money::from_cents(100), 1),
    ])
    .unwrap();

    let books = Collection::<Book>::open(fixture.data_dir(), &fixture.config());
    let titles: Vec<String> = books.list().unwrap().into_iter().map(|b| b.title).collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[test]
fn test_capacity_applies_to_load() {
    let fixture = StorageTestFixture::new();
    let file = FlatFile::for_collection::<Book>(fixture.data_dir(), SyncMode::None);
    file.save(&boundary_books()).unwrap();

    let config = StorageConfig::default()
        .with_capacity(2)
        .with_sync_mode(SyncMode::None);
    let books = Collection::<Book>::open(fixture.data_dir(), &config);
    assert_eq!(books.len().unwrap(), 2);
    assert!(books
        .insert(Book::new(99, "Late", "X", Money::from_cents(100), 1))
        .is_err());
}
