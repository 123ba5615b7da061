//! Walks through a day at a small bookstore backed by ShelfLite.
//!
//! Run with: cargo run -p shelflite --example bookstore_demo
//! Set RUST_LOG=debug to see one event per saved mutation.

use shelflite::logging::{LogConfig, LogFormat};
use shelflite::{
    Book, BookField, BookPatch, Bookstore, Customer, Error, Money, ReferentialPolicy, StoreConfig,
};
use std::path::Path;
use std::thread;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = LogConfig::info().with_format(LogFormat::Compact).init()?;
    let data_dir = "./demo_bookstore";

    println!("=== ShelfLite Bookstore Demo ===\n");

    if Path::new(data_dir).exists() {
        std::fs::remove_dir_all(data_dir)?;
        println!("🧹 Cleaned up previous demo data\n");
    }

    // PART 1: Stock the shelves
    println!("📚 PART 1: Stocking the catalog...");
    {
        let store = Bookstore::open(data_dir)?;
        store.add_book(Book::new(1234, "Dune", "Frank Herbert", Money::from_cents(1000), 5))?;
        store.add_book(Book::new(5678, "Emma", "Jane Austen", Money::from_cents(850), 2))?;
        store.add_book(Book::new(9012, "Ulysses", "James Joyce", Money::from_cents(1500), 1))?;
        store.add_customer(Customer::new(7, "Ada Lovelace", "5551234567"))?;
        store.add_customer(Customer::new(8, "Grace Hopper", "5559876543"))?;

        match store.add_book(Book::new(1234, "Dune Messiah", "Frank Herbert", Money::from_cents(1100), 3)) {
            Err(Error::DuplicateKey { key, .. }) => println!("   ⚠️  ISBN {} already in the catalog", key),
            other => println!("   unexpected: {:?}", other),
        }

        let counts = store.counts()?;
        println!("   ✅ {} books, {} customers", counts.books, counts.customers);
    }
    println!("   🔒 Store closed, everything is already on disk\n");

    // PART 2: Sell
    println!("💰 PART 2: Selling books...");
    let store = Bookstore::open(data_dir)?;
    let sale = store.process_sale(7, 1234, 2)?;
    println!(
        "   Sale #{}: {} x ISBN {} for {}",
        sale.sale_id, sale.quantity, sale.isbn, sale.total_price
    );

    if let Err(e) = store.process_sale(8, 5678, 3) {
        println!("   ⚠️  {}", e);
    }

    // Two registers race for the last copy of Ulysses
    let outcomes: Vec<_> = thread::scope(|s| {
        let registers: Vec<_> = [7, 8]
            .into_iter()
            .map(|customer_id| {
                let store = store.clone();
                s.spawn(move || store.process_sale(customer_id, 9012, 1))
            })
            .collect();
        registers.into_iter().map(|h| h.join()).collect()
    });
    let sold = outcomes.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    println!("   Last copy of Ulysses sold {} time(s)\n", sold);

    // PART 3: Maintain the catalog
    println!("🛠️  PART 3: Editing and searching...");
    let report = store.edit_book(5678, BookPatch::new().quantity(10).price(Money::ZERO))?;
    println!("   Applied {:?}", report.applied);
    for rejected in &report.rejected {
        println!("   Kept old {}: {}", rejected.field, rejected.reason);
    }
    for book in store.search_books(BookField::Author, "jane")? {
        println!("   Found: {} by {} ({} in stock)", book.title, book.author, book.quantity);
    }
    println!();

    // PART 4: Report
    println!("📊 PART 4: Sales report");
    let report = store.sales_report()?;
    for line in &report.by_book {
        println!("   {:<10} {:>3} sold  {:>8}", line.title, line.copies_sold, line.revenue);
    }
    for line in &report.by_customer {
        println!("   {:<14} {:>2} purchases  {:>8}", line.name, line.purchases, line.total_spent);
    }
    println!("   Total revenue: {}\n", report.total_revenue);

    // PART 5: Referential checks
    println!("🔗 PART 5: Enforced references");
    drop(store);
    let strict = Bookstore::open_with_config(
        data_dir,
        StoreConfig::default().with_referential_policy(ReferentialPolicy::Enforce),
    )?;
    if let Err(e) = strict.delete_book(1234) {
        println!("   ⚠️  {}", e);
    }
    if let Err(e) = strict.process_sale(99, 5678, 1) {
        println!("   ⚠️  {}", e);
    }

    println!("\n✅ Demo complete. Data kept in {}", data_dir);
    Ok(())
}
