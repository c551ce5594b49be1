//! # quire-db: Database Layer for Quire ERP
//!
//! SQLite storage for Quire, via sqlx. Every multi-step state change of the
//! order-to-invoice workflow is one transaction in this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quire Data Flow                                  │
//! │                                                                         │
//! │  quire-service command (generate_invoice)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     quire-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ Inventory     │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SalesOrder    │    │ 001_initial  │  │   │
//! │  │   │ WAL, FKs,     │    │ Invoice       │    │ _schema.sql  │  │   │
//! │  │   │ busy timeout  │    │ Audit, ...    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quire_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("quire.db")).await?;
//! let levels = db.inventory().stock_levels(None).await?;
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DatabaseHealth, DbConfig};

pub use repository::audit::AuditRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::inventory::InventoryRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::master::{MasterDataRepository, NewCustomer, NewUser};
pub use repository::report::ReportRepository;
pub use repository::sales::SalesOrderRepository;
pub use repository::RowStream;
