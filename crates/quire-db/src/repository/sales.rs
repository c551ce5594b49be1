//! # Sales Order Repository
//!
//! Storage side of the order lifecycle up to confirmation. Invoicing lives
//! in [`crate::repository::invoice`].
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. insert_proforma()  → SalesOrder { status: PROFORMA } + items        │
//! │     (one transaction; draft already priced and credit-checked)          │
//! │                                                                         │
//! │  2. approve()          → approved_by set (optional)                     │
//! │                                                                         │
//! │  3. confirm()          → SalesOrder { status: CONFIRMED }               │
//! │     (single conditional UPDATE: status + approval in the WHERE clause)  │
//! │                                                                         │
//! │  4. invoice            → see InvoiceRepository::generate                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::{ORDER_COLUMNS, ORDER_ITEM_COLUMNS};
use quire_core::order::{ensure_approvable, ensure_confirmable};
use quire_core::views::{OrderSummary, OrderView};
use quire_core::{OrderStatus, ProformaDraft, SalesOrder, SalesOrderItem};

/// Repository for sales orders and their items.
#[derive(Debug, Clone)]
pub struct SalesOrderRepository {
    pool: SqlitePool,
}

impl SalesOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalesOrderRepository { pool }
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<SalesOrder>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM sales_orders WHERE id = ?1");

        let order = sqlx::query_as::<_, SalesOrder>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn items(&self, sales_order_id: i64) -> DbResult<Vec<SalesOrderItem>> {
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM sales_order_items WHERE sales_order_id = ?1 ORDER BY id"
        );

        let items = sqlx::query_as::<_, SalesOrderItem>(&sql)
            .bind(sales_order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Order with its lines, or `None` when unknown.
    pub async fn get_view(&self, id: i64) -> DbResult<Option<OrderView>> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };
        let items = self.items(id).await?;

        Ok(Some(OrderView { order, items }))
    }

    /// Lists orders, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<OrderStatus>, limit: i64) -> DbResult<Vec<OrderSummary>> {
        let summaries = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id,
                o.customer_id,
                c.name AS customer_name,
                o.status,
                o.total_cents,
                o.requires_approval,
                o.approved_by,
                o.created_at
            FROM sales_orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE ?1 IS NULL OR o.status = ?1
            ORDER BY o.id DESC
            LIMIT ?2
            "#,
        )
        .bind(status)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Stores a priced proforma and its lines as one unit.
    pub async fn insert_proforma(&self, draft: &ProformaDraft) -> DbResult<OrderView> {
        debug!(
            customer_id = draft.customer_id,
            lines = draft.lines.len(),
            total = %draft.total,
            "Inserting proforma order"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO sales_orders (
                customer_id, status, total_cents, requires_approval,
                approved_by, created_by, created_at, updated_at
            ) VALUES (?1, 'PROFORMA', ?2, ?3, NULL, ?4, ?5, ?5)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, SalesOrder>(&sql)
            .bind(draft.customer_id)
            .bind(draft.total.cents())
            .bind(draft.requires_approval)
            .bind(draft.created_by)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        let item_sql = format!(
            r#"
            INSERT INTO sales_order_items (
                sales_order_id, book_title_id, quantity,
                selling_price_cents, discount_bps, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {ORDER_ITEM_COLUMNS}
            "#
        );

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let item = sqlx::query_as::<_, SalesOrderItem>(&item_sql)
                .bind(order.id)
                .bind(line.book_title_id)
                .bind(line.quantity)
                .bind(line.selling_price_cents)
                .bind(line.discount_bps)
                .bind(line.line_total_cents)
                .fetch_one(&mut *tx)
                .await?;
            items.push(item);
        }

        tx.commit().await?;

        info!(
            order_id = order.id,
            customer_id = order.customer_id,
            requires_approval = order.requires_approval,
            "Proforma order created"
        );
        Ok(OrderView { order, items })
    }

    /// Records the approver of a proforma order.
    pub async fn approve(&self, order_id: i64, approver_id: i64) -> DbResult<SalesOrder> {
        let sql = format!(
            r#"
            UPDATE sales_orders
               SET approved_by = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'PROFORMA'
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let approved = sqlx::query_as::<_, SalesOrder>(&sql)
            .bind(order_id)
            .bind(approver_id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match approved {
            Some(order) => {
                info!(order_id, approver_id, "Sales order approved");
                Ok(order)
            }
            None => {
                let order = self.require(order_id).await?;
                ensure_approvable(&order)?;
                Err(DbError::TransactionFailed(format!(
                    "sales order {order_id} changed during approval"
                )))
            }
        }
    }

    /// Moves a proforma to CONFIRMED.
    ///
    /// An order that requires approval passes when it was approved earlier
    /// or when `approver_id` is given; the approver is then recorded.
    pub async fn confirm(&self, order_id: i64, approver_id: Option<i64>) -> DbResult<SalesOrder> {
        let now = Utc::now();

        let sql = format!(
            r#"
            UPDATE sales_orders
               SET status = 'CONFIRMED',
                   approved_by = COALESCE(approved_by, ?2),
                   confirmed_at = ?3,
                   updated_at = ?3
             WHERE id = ?1
               AND status = 'PROFORMA'
               AND (requires_approval = 0 OR approved_by IS NOT NULL OR ?2 IS NOT NULL)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let confirmed = sqlx::query_as::<_, SalesOrder>(&sql)
            .bind(order_id)
            .bind(approver_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(order) = confirmed {
            info!(order_id, approved_by = ?order.approved_by, "Sales order confirmed");
            return Ok(order);
        }

        let order = self.require(order_id).await?;
        ensure_confirmable(&order, approver_id.is_some())?;
        Err(DbError::TransactionFailed(format!(
            "sales order {order_id} changed during confirmation"
        )))
    }

    async fn require(&self, order_id: i64) -> DbResult<SalesOrder> {
        self.get(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("SalesOrder", order_id))
    }
}
