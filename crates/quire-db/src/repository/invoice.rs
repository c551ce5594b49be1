//! # Invoice Repository
//!
//! The CONFIRMED → INVOICED transition and invoice lookups.
//!
//! ## Invoicing Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. claim    UPDATE sales_orders SET status = 'INVOICED'               │
//! │               WHERE id = :order AND status = 'CONFIRMED'                │
//! │               (0 rows → NotFound / AlreadyInvoiced / InvalidTransition) │
//! │   2. stock    per book, ascending id: guarded decrement                 │
//! │               (any shortfall → InsufficientStock, whole txn rolled back)│
//! │   3. balance  customers.outstanding += invoice total                    │
//! │   4. number   sequences.value += 1 RETURNING value                      │
//! │   5. insert   invoices (UNIQUE sales_order_id, UNIQUE invoice_number)   │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The claim is the first statement, so the transaction holds the SQLite
//! writer lock before it reads anything. Of two concurrent attempts on the
//! same order exactly one claims it; the other sees INVOICED and reports
//! `AlreadyInvoiced`. A rolled-back attempt never consumes an invoice
//! number.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::inventory::{current_quantity, take_stock};
use crate::repository::{INVOICE_COLUMNS, ORDER_COLUMNS};
use quire_core::invoice::format_invoice_number;
use quire_core::order::ensure_transition;
use quire_core::{
    CoreError, Invoice, InvoiceTotals, InvoiceType, Money, OrderStatus, SalesOrder, TaxTable,
    ValidationError,
};

/// Name of the invoice counter row in `sequences`.
const INVOICE_SEQUENCE: &str = "invoice";

/// Repository for invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Invoices a confirmed order from one warehouse.
    ///
    /// The caller has checked that the warehouse exists.
    pub async fn generate(
        &self,
        order_id: i64,
        invoice_type: InvoiceType,
        warehouse_id: i64,
        tax_table: &TaxTable,
        prefix: &str,
    ) -> DbResult<Invoice> {
        debug!(order_id, invoice_type = %invoice_type, warehouse_id, "Generating invoice");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // 1. Claim the order
        let sql = format!(
            r#"
            UPDATE sales_orders
               SET status = 'INVOICED', invoiced_at = ?2, updated_at = ?2
             WHERE id = ?1 AND status = 'CONFIRMED'
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let claimed = sqlx::query_as::<_, SalesOrder>(&sql)
            .bind(order_id)
            .bind(now)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = claimed else {
            let status: Option<OrderStatus> =
                sqlx::query_scalar("SELECT status FROM sales_orders WHERE id = ?1")
                    .bind(order_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match status {
                None => Err(DbError::not_found("SalesOrder", order_id)),
                Some(from) => {
                    ensure_transition(order_id, from, OrderStatus::Invoiced)?;
                    Err(DbError::TransactionFailed(format!(
                        "sales order {order_id} changed during invoicing"
                    )))
                }
            };
        };

        // 2. Deduct stock, one guarded decrement per title in ascending id order
        let demand: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT book_title_id, SUM(quantity)
              FROM sales_order_items
             WHERE sales_order_id = ?1
             GROUP BY book_title_id
             ORDER BY book_title_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for (book_title_id, quantity) in demand {
            if !take_stock(&mut tx, book_title_id, warehouse_id, quantity, now).await? {
                let available = current_quantity(&mut tx, book_title_id, warehouse_id)
                    .await?
                    .unwrap_or(0);
                return Err(CoreError::InsufficientStock {
                    book_title_id,
                    warehouse_id,
                    available,
                    requested: quantity,
                }
                .into());
            }
        }

        // 3. Customer balance
        let totals = InvoiceTotals::compute(Money::from_cents(order.total_cents), invoice_type, tax_table);

        let updated = sqlx::query(
            r#"
            UPDATE customers SET outstanding_cents = outstanding_cents + ?2
             WHERE id = ?1 AND outstanding_cents <= ?3
            "#,
        )
        .bind(order.customer_id)
        .bind(totals.total.cents())
        .bind(i64::MAX.saturating_sub(totals.total.cents()))
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
                .bind(order.customer_id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match exists {
                None => DbError::not_found("Customer", order.customer_id),
                Some(_) => CoreError::from(ValidationError::amount_overflow("outstanding")).into(),
            });
        }

        // 4. Next invoice number
        let seq: i64 = sqlx::query_scalar(
            "UPDATE sequences SET value = value + 1 WHERE name = ?1 RETURNING value",
        )
        .bind(INVOICE_SEQUENCE)
        .fetch_one(&mut *tx)
        .await?;

        // 5. Invoice row
        let invoice_sql = format!(
            r#"
            INSERT INTO invoices (
                sales_order_id, invoice_seq, invoice_number, invoice_type, warehouse_id,
                subtotal_cents, gst_rate_bps, gst_cents, total_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        let invoice = sqlx::query_as::<_, Invoice>(&invoice_sql)
            .bind(order_id)
            .bind(seq)
            .bind(format_invoice_number(prefix, seq))
            .bind(invoice_type)
            .bind(warehouse_id)
            .bind(totals.subtotal.cents())
            .bind(totals.gst_rate.bps() as i64)
            .bind(totals.gst.cents())
            .bind(totals.total.cents())
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } if field.contains("sales_order_id") => {
                    DbError::Domain(CoreError::AlreadyInvoiced { order_id })
                }
                other => other,
            })?;

        tx.commit().await?;

        info!(
            order_id,
            invoice_number = %invoice.invoice_number,
            total = %totals.total,
            gst = %totals.gst,
            "Invoice generated"
        );
        Ok(invoice)
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    pub async fn get_by_order(&self, sales_order_id: i64) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE sales_order_id = ?1");

        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(sales_order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// A customer's invoices, newest first.
    pub async fn list_for_customer(&self, customer_id: i64, limit: i64) -> DbResult<Vec<Invoice>> {
        let columns = INVOICE_COLUMNS
            .split(", ")
            .map(|c| format!("i.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT {columns}
              FROM invoices i
              JOIN sales_orders o ON o.id = i.sales_order_id
             WHERE o.customer_id = ?1
             ORDER BY i.invoice_seq DESC
             LIMIT ?2
            "#
        );

        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(customer_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }
}
