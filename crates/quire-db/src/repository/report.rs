//! # Report Repository
//!
//! Read-only aggregates for the reporting screens.

use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::CUSTOMER_COLUMNS;
use quire_core::views::{CustomerBalance, CustomerStatement, Daybook, DaybookEntry, OutstandingReport};
use quire_core::Customer;

/// Repository for reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Customers with a non-zero balance, largest first.
    pub async fn outstanding(&self, branch_id: Option<i64>) -> DbResult<OutstandingReport> {
        let customers = sqlx::query_as::<_, CustomerBalance>(
            r#"
            SELECT
                id AS customer_id,
                name AS customer_name,
                branch_id,
                credit_limit_cents,
                outstanding_cents
            FROM customers
            WHERE outstanding_cents > 0
              AND (?1 IS NULL OR branch_id = ?1)
            ORDER BY outstanding_cents DESC, id
            "#,
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(OutstandingReport::new(branch_id, customers))
    }

    /// Invoices created on `date` (UTC), in number order.
    pub async fn daybook(&self, date: NaiveDate) -> DbResult<Daybook> {
        let start = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let end = start + Days::new(1);

        let entries = sqlx::query_as::<_, DaybookEntry>(
            r#"
            SELECT
                i.id AS invoice_id,
                i.invoice_number,
                i.invoice_type,
                i.sales_order_id,
                o.customer_id,
                c.name AS customer_name,
                i.subtotal_cents,
                i.gst_cents,
                i.total_cents,
                i.created_at
            FROM invoices i
            JOIN sales_orders o ON o.id = i.sales_order_id
            JOIN customers c ON c.id = o.customer_id
            WHERE i.created_at >= ?1 AND i.created_at < ?2
            ORDER BY i.invoice_seq
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(Daybook::new(date, entries))
    }

    /// Account position and the latest `limit` invoices of a customer.
    pub async fn customer_statement(&self, customer_id: i64, limit: i64) -> DbResult<Option<CustomerStatement>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");

        let Some(customer) = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let invoices = InvoiceRepository::new(self.pool.clone())
            .list_for_customer(customer_id, limit)
            .await?;

        Ok(Some(CustomerStatement::new(customer, invoices)))
    }
}
