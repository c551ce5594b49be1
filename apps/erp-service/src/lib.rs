//! # quire-service: Order-to-Invoice Workflow
//!
//! The operations callers invoke: create, approve and confirm orders,
//! generate invoices, move stock, and read reports.
//!
//! ## Module Organization
//! ```text
//! quire_service/
//! ├── lib.rs          ◄─── Erp handle (open & shutdown)
//! ├── config.rs       ◄─── QUIRE_* environment configuration
//! ├── error.rs        ◄─── ApiError returned by every command
//! ├── audit.rs        ◄─── Best-effort audit trail
//! ├── telemetry.rs    ◄─── tracing subscriber setup
//! └── commands/
//!     ├── order.rs     ◄─── Orders, credit preview, invoicing
//!     ├── inventory.rs ◄─── Adjust, transfer, thresholds, stock views
//!     ├── catalog.rs   ◄─── Book titles
//!     └── report.rs    ◄─── Outstanding, daybook, statements, audit history
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use quire_service::{commands, config::ErpConfig, telemetry, Erp};
//!
//! let config = ErpConfig::load()?;
//! telemetry::init_tracing(&config.log_filter);
//!
//! let erp = Erp::open(config).await?;
//! let order = commands::order::create_order(&erp, &actor, request).await?;
//! erp.shutdown().await;
//! ```

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod telemetry;

use tracing::info;

use audit::AuditTrail;
use config::ErpConfig;
use quire_db::{Database, DatabaseHealth};

pub use error::{ApiError, ApiResult, ErrorCode};

/// Open ERP instance: storage handle plus configuration.
///
/// Constructed once at startup and passed to every command; closed with
/// [`Erp::shutdown`].
#[derive(Debug, Clone)]
pub struct Erp {
    db: Database,
    config: ErpConfig,
    audit: AuditTrail,
}

impl Erp {
    /// Opens the database (running migrations) and wires the service.
    pub async fn open(config: ErpConfig) -> ApiResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(
            path = %config.database_path.display(),
            invoice_prefix = %config.invoice_prefix,
            "Quire ERP opened"
        );
        Ok(Self::with_database(db, config))
    }

    /// Wraps an already-open database.
    pub fn with_database(db: Database, config: ErpConfig) -> Self {
        let audit = AuditTrail::new(db.audit());
        Erp { db, config, audit }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &ErpConfig {
        &self.config
    }

    pub fn audit(&self) -> &AuditTrail {
        &self.audit
    }

    /// Storage reachability and migration state.
    pub async fn health(&self) -> DatabaseHealth {
        self.db.health().await
    }

    /// Closes the storage pool. In-flight commands finish first.
    pub async fn shutdown(self) {
        self.db.close().await;
        info!("Quire ERP closed");
    }
}
