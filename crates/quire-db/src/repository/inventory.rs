//! # Inventory Repository
//!
//! The inventory ledger: one row per (book, warehouse), quantity never
//! negative.
//!
//! ## Guarded Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE inventory                                                       │
//! │     SET quantity = quantity - :qty                                      │
//! │   WHERE book_title_id = :book AND warehouse_id = :wh                    │
//! │     AND quantity >= :qty            ◄── the guard                       │
//! │                                                                         │
//! │  rows_affected = 1 → decremented                                        │
//! │  rows_affected = 0 → row missing (NotFound) or short (InsufficientStock)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check and the decrement are one statement, so two concurrent
//! decrements can never both pass the guard on the same stock. The schema's
//! `CHECK (quantity >= 0)` backs this up.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{RowStream, INVENTORY_COLUMNS};
use quire_core::views::{StockLevel, TransferResult};
use quire_core::{CoreError, InventoryRow};

const STOCK_LEVEL_SELECT: &str = r#"
    SELECT
        i.book_title_id,
        b.isbn,
        b.title,
        i.warehouse_id,
        w.name AS warehouse_name,
        i.quantity,
        i.min_stock,
        i.max_stock
    FROM inventory i
    JOIN book_titles b ON b.id = i.book_title_id
    JOIN warehouses w ON w.id = i.warehouse_id
"#;

/// Repository for the inventory ledger.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets the row for a (book, warehouse) pair.
    pub async fn get(&self, book_title_id: i64, warehouse_id: i64) -> DbResult<Option<InventoryRow>> {
        let sql = format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE book_title_id = ?1 AND warehouse_id = ?2"
        );

        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(book_title_id)
            .bind(warehouse_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Current quantity, zero when no row exists.
    pub async fn quantity(&self, book_title_id: i64, warehouse_id: i64) -> DbResult<i64> {
        Ok(self
            .get(book_title_id, warehouse_id)
            .await?
            .map(|row| row.quantity)
            .unwrap_or(0))
    }

    /// Total stock of a title across all warehouses.
    pub async fn total_quantity(&self, book_title_id: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM inventory WHERE book_title_id = ?1",
        )
        .bind(book_title_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies a signed change to one row, creating it at zero if absent.
    ///
    /// The caller has already checked that the book and warehouse exist and
    /// that `delta` is non-zero and within `MAX_STOCK_DELTA`.
    pub async fn adjust(&self, book_title_id: i64, warehouse_id: i64, delta: i64) -> DbResult<InventoryRow> {
        debug!(book_title_id, warehouse_id, delta, "Adjusting stock");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Taking the write lock first: this insert is a no-op when the row exists.
        sqlx::query(
            r#"
            INSERT INTO inventory (book_title_id, warehouse_id, quantity, min_stock, max_stock, updated_at)
            VALUES (?1, ?2, 0, 0, 0, ?3)
            ON CONFLICT (book_title_id, warehouse_id) DO NOTHING
            "#,
        )
        .bind(book_title_id)
        .bind(warehouse_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            r#"
            UPDATE inventory
               SET quantity = quantity + ?3, updated_at = ?4
             WHERE book_title_id = ?1 AND warehouse_id = ?2
               AND quantity + ?3 >= 0
            "#,
        )
        .bind(book_title_id)
        .bind(warehouse_id)
        .bind(delta)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let available = current_quantity(&mut tx, book_title_id, warehouse_id)
                .await?
                .unwrap_or(0);
            return Err(CoreError::InsufficientStock {
                book_title_id,
                warehouse_id,
                available,
                requested: delta.checked_neg().unwrap_or(i64::MAX),
            }
            .into());
        }

        let row = fetch_row(&mut tx, book_title_id, warehouse_id).await?;
        tx.commit().await?;

        info!(book_title_id, warehouse_id, delta, quantity = row.quantity, "Stock adjusted");
        Ok(row)
    }

    /// Moves stock between two warehouses as one atomic unit.
    ///
    /// Source shortfall → `InsufficientStock`; no source row → `NotFound`.
    /// The target row is created when absent.
    pub async fn transfer(
        &self,
        book_title_id: i64,
        source_warehouse_id: i64,
        target_warehouse_id: i64,
        quantity: i64,
    ) -> DbResult<TransferResult> {
        debug!(
            book_title_id,
            source_warehouse_id, target_warehouse_id, quantity, "Transferring stock"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let taken = take_stock(&mut tx, book_title_id, source_warehouse_id, quantity, now).await?;
        if !taken {
            return Err(
                match current_quantity(&mut tx, book_title_id, source_warehouse_id).await? {
                    None => DbError::not_found(
                        "Inventory",
                        format!("book {book_title_id} in warehouse {source_warehouse_id}"),
                    ),
                    Some(available) => CoreError::InsufficientStock {
                        book_title_id,
                        warehouse_id: source_warehouse_id,
                        available,
                        requested: quantity,
                    }
                    .into(),
                },
            );
        }

        sqlx::query(
            r#"
            INSERT INTO inventory (book_title_id, warehouse_id, quantity, min_stock, max_stock, updated_at)
            VALUES (?1, ?2, ?3, 0, 0, ?4)
            ON CONFLICT (book_title_id, warehouse_id)
            DO UPDATE SET quantity = quantity + excluded.quantity,
                          updated_at = excluded.updated_at
            "#,
        )
        .bind(book_title_id)
        .bind(target_warehouse_id)
        .bind(quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let source = fetch_row(&mut tx, book_title_id, source_warehouse_id).await?;
        let target = fetch_row(&mut tx, book_title_id, target_warehouse_id).await?;
        tx.commit().await?;

        info!(
            book_title_id,
            source_warehouse_id,
            target_warehouse_id,
            quantity,
            "Stock transferred"
        );
        Ok(TransferResult { source, target })
    }

    /// Sets the low/high thresholds of a row, creating it at zero if absent.
    pub async fn set_thresholds(
        &self,
        book_title_id: i64,
        warehouse_id: i64,
        min_stock: i64,
        max_stock: i64,
    ) -> DbResult<InventoryRow> {
        let sql = format!(
            r#"
            INSERT INTO inventory (book_title_id, warehouse_id, quantity, min_stock, max_stock, updated_at)
            VALUES (?1, ?2, 0, ?3, ?4, ?5)
            ON CONFLICT (book_title_id, warehouse_id)
            DO UPDATE SET min_stock = excluded.min_stock,
                          max_stock = excluded.max_stock,
                          updated_at = excluded.updated_at
            RETURNING {INVENTORY_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(book_title_id)
            .bind(warehouse_id)
            .bind(min_stock)
            .bind(max_stock)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Stock levels, optionally for one warehouse, ordered by title.
    pub async fn stock_levels(&self, warehouse_id: Option<i64>) -> DbResult<Vec<StockLevel>> {
        let sql = format!(
            "{STOCK_LEVEL_SELECT} WHERE ?1 IS NULL OR i.warehouse_id = ?1 ORDER BY b.title, w.name"
        );

        let levels = sqlx::query_as::<_, StockLevel>(&sql)
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(levels)
    }

    /// Rows at or under their minimum, fetched lazily.
    ///
    /// Each call runs the query afresh; the stream ends after the last row.
    pub fn low_stock(&self, warehouse_id: Option<i64>) -> RowStream<'_, StockLevel> {
        let rows = sqlx::query_as::<_, StockLevel>(LOW_STOCK_SQL)
            .bind(warehouse_id)
            .fetch(&self.pool)
            .map(|row| row.map_err(DbError::from));

        Box::pin(rows)
    }
}

const LOW_STOCK_SQL: &str = r#"
    SELECT
        i.book_title_id,
        b.isbn,
        b.title,
        i.warehouse_id,
        w.name AS warehouse_name,
        i.quantity,
        i.min_stock,
        i.max_stock
    FROM inventory i
    JOIN book_titles b ON b.id = i.book_title_id
    JOIN warehouses w ON w.id = i.warehouse_id
    WHERE i.quantity <= i.min_stock
      AND (?1 IS NULL OR i.warehouse_id = ?1)
    ORDER BY i.warehouse_id, i.book_title_id
"#;

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Guarded decrement. Returns false when the row is missing or short.
pub(crate) async fn take_stock(
    tx: &mut Transaction<'_, Sqlite>,
    book_title_id: i64,
    warehouse_id: i64,
    quantity: i64,
    now: chrono::DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE inventory
           SET quantity = quantity - ?3, updated_at = ?4
         WHERE book_title_id = ?1 AND warehouse_id = ?2
           AND quantity >= ?3
        "#,
    )
    .bind(book_title_id)
    .bind(warehouse_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub(crate) async fn current_quantity(
    tx: &mut Transaction<'_, Sqlite>,
    book_title_id: i64,
    warehouse_id: i64,
) -> DbResult<Option<i64>> {
    let quantity: Option<i64> = sqlx::query_scalar(
        "SELECT quantity FROM inventory WHERE book_title_id = ?1 AND warehouse_id = ?2",
    )
    .bind(book_title_id)
    .bind(warehouse_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(quantity)
}

async fn fetch_row(
    tx: &mut Transaction<'_, Sqlite>,
    book_title_id: i64,
    warehouse_id: i64,
) -> DbResult<InventoryRow> {
    let sql = format!(
        "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE book_title_id = ?1 AND warehouse_id = ?2"
    );

    let row = sqlx::query_as::<_, InventoryRow>(&sql)
        .bind(book_title_id)
        .bind(warehouse_id)
        .fetch_one(&mut **tx)
        .await?;

    Ok(row)
}

// =============================================================================
// Unit Tests
// =============================================================================
