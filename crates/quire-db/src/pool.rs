//! # Storage Handle
//!
//! Opens the SQLite pool behind [`Database`] and hands out one repository
//! per aggregate.
//!
//! ```text
//! ErpConfig ──► DbConfig ──► Database::new ──► pool + migrations
//!                                  │
//!          ┌──────────┬──────────┬─┴────────┬───────────┬────────┐
//!          ▼          ▼          ▼          ▼           ▼        ▼
//!       master()  catalog()  inventory() sales_orders() invoices() ...
//! ```
//!
//! ## Writers
//! SQLite admits one writer at a time. Every write transaction in this crate
//! issues a write statement first, so it holds the writer lock before any
//! read that feeds a decision. Contending writers wait up to `busy_timeout`.

use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::audit::AuditRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::inventory::InventoryRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::master::MasterDataRepository;
use crate::repository::report::ReportRepository;
use crate::repository::sales::SalesOrderRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Pool and SQLite settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/quire/quire.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, or `:memory:`.
    pub database_path: PathBuf,
    /// Default 5.
    pub max_connections: u32,
    /// Default 1.
    pub min_connections: u32,
    /// Pool acquire timeout. Default 30s.
    pub connect_timeout: Duration,
    /// Default 10 minutes.
    pub idle_timeout: Duration,
    /// How long a writer waits for the SQLite lock. Default 10s.
    pub busy_timeout: Duration,
    /// Apply embedded migrations on open. Default true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// File-backed database at `path`, created when missing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory database for tests and dry runs.
    ///
    /// Every in-memory connection is a separate database, so the pool holds
    /// exactly one.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

// =============================================================================
// Health
// =============================================================================

/// Storage diagnostics printed by the operations CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    /// `SELECT 1` succeeded.
    pub reachable: bool,
    pub migrations_embedded: usize,
    pub migrations_applied: usize,
}

impl DatabaseHealth {
    pub fn is_healthy(&self) -> bool {
        self.reachable && self.migrations_applied == self.migrations_embedded
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared storage handle. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool with WAL (file databases only), foreign keys and the
    /// busy timeout, then applies migrations unless disabled.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        let connect_options = connect_options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        debug!(busy_timeout = ?config.busy_timeout, "Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool, for tests and the seed binary.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Branches, warehouses, customers and users.
    pub fn master(&self) -> MasterDataRepository {
        MasterDataRepository::new(self.pool.clone())
    }

    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub fn inventory(&self) -> InventoryRepository {
        InventoryRepository::new(self.pool.clone())
    }

    pub fn sales_orders(&self) -> SalesOrderRepository {
        SalesOrderRepository::new(self.pool.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    pub fn audit(&self) -> AuditRepository {
        AuditRepository::new(self.pool.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone())
    }

    /// Closes the pool. Later repository calls fail with a pool error.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks the pool and compares applied migrations with embedded ones.
    ///
    /// Never fails: an unreachable database reports `reachable: false` and
    /// zero applied migrations.
    pub async fn health(&self) -> DatabaseHealth {
        let reachable = sqlx::query("SELECT 1").execute(&self.pool).await.is_ok();

        let migrations_applied = if reachable {
            migrations::applied_count(&self.pool).await.unwrap_or_else(|e| {
                warn!(error = %e, "Could not read migration history");
                0
            })
        } else {
            0
        };

        DatabaseHealth {
            reachable,
            migrations_embedded: migrations::embedded_count(),
            migrations_applied,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
