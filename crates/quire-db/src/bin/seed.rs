//! # Sample Data Loader
//!
//! Populates a fresh database with the sample catalog for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p quire-db --bin seed
//!
//! # Specify database path
//! cargo run -p quire-db --bin seed -- --db ./data/quire.db
//! ```
//!
//! ## Loaded Data
//! - Branch "Head Office" (head office) with "Central Warehouse"
//! - Admin user `admin@erp.com`
//! - Three titles, 100 copies each in the central warehouse,
//!   thresholds min 10 / max 500

use std::env;

use quire_core::{NewBookTitle, Role};
use quire_db::{Database, DbConfig, NewUser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (isbn, title, author, publisher, price in cents)
const BOOKS: &[(&str, &str, &str, &str, i64)] = &[
    ("978-0134685991", "Effective Java", "Joshua Bloch", "Addison-Wesley", 4500),
    ("978-0201633610", "Design Patterns", "Erich Gamma", "Addison-Wesley", 5000),
    ("978-0132350884", "Clean Code", "Robert C. Martin", "Prentice Hall", 4000),
];

const OPENING_STOCK: i64 = 100;
const MIN_STOCK: i64 = 10;
const MAX_STOCK: i64 = 500;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./quire_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Quire sample data loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./quire_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    info!(path = %db_path, "Connected, migrations applied");

    let master = db.master();
    if master.get_branch(1).await?.is_some() {
        warn!("Database already has reference data; delete the file to reseed");
        db.close().await;
        return Ok(());
    }

    let head_office = master
        .insert_branch("Head Office", Some("123 Main St, Tech City"), true)
        .await?;
    let warehouse = master.insert_warehouse("Central Warehouse", head_office.id).await?;
    info!(branch = %head_office.name, warehouse = %warehouse.name, "Created branch and warehouse");

    let admin = master
        .insert_user(&NewUser {
            name: "System Admin".to_string(),
            email: "admin@erp.com".to_string(),
            role: Role::Admin,
            branch_id: Some(head_office.id),
            customer_id: None,
        })
        .await?;
    info!(email = %admin.email, "Created admin user");

    for (isbn, title, author, publisher, price_cents) in BOOKS {
        let book = db
            .catalog()
            .insert(&NewBookTitle {
                isbn: isbn.to_string(),
                title: title.to_string(),
                author: Some(author.to_string()),
                publisher: Some(publisher.to_string()),
                price_cents: *price_cents,
            })
            .await?;

        db.inventory().adjust(book.id, warehouse.id, OPENING_STOCK).await?;
        db.inventory()
            .set_thresholds(book.id, warehouse.id, MIN_STOCK, MAX_STOCK)
            .await?;

        info!(title = %book.title, quantity = OPENING_STOCK, "Created book");
    }

    info!("Seed complete");
    db.close().await;
    Ok(())
}
