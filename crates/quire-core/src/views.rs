//! # Views
//!
//! JSON shapes handed to the presentation layer. Rendering, CSV and print
//! export are the client's business; these types only carry the numbers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Customer, Invoice, InventoryRow, InvoiceType, OrderStatus, SalesOrder, SalesOrderItem};

// =============================================================================
// Orders and Invoices
// =============================================================================

/// A sales order with its lines.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderView {
    pub order: SalesOrder,
    pub items: Vec<SalesOrderItem>,
}

/// One row of an order listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderSummary {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub requires_approval: bool,
    pub approved_by: Option<i64>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Invoice plus the order it was raised from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub order: SalesOrder,
    pub items: Vec<SalesOrderItem>,
}

// =============================================================================
// Stock
// =============================================================================

/// Stock of one title in one warehouse, with names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub book_title_id: i64,
    pub isbn: String,
    pub title: String,
    pub warehouse_id: i64,
    pub warehouse_name: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
}

impl StockLevel {
    /// Copies needed to get back to the minimum. Zero when at or above it.
    pub fn shortfall(&self) -> i64 {
        (self.min_stock - self.quantity).max(0)
    }
}

/// Both rows touched by a transfer, after the move.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransferResult {
    pub source: InventoryRow,
    pub target: InventoryRow,
}

// =============================================================================
// Reports
// =============================================================================

/// Outstanding balance of one customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CustomerBalance {
    pub customer_id: i64,
    pub customer_name: String,
    pub branch_id: i64,
    pub credit_limit_cents: i64,
    pub outstanding_cents: i64,
}

/// Receivables across customers, optionally limited to one branch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OutstandingReport {
    pub branch_id: Option<i64>,
    pub customers: Vec<CustomerBalance>,
    pub total_outstanding_cents: i64,
}

impl OutstandingReport {
    pub fn new(branch_id: Option<i64>, customers: Vec<CustomerBalance>) -> Self {
        let total: Money = customers
            .iter()
            .map(|c| Money::from_cents(c.outstanding_cents))
            .sum();

        OutstandingReport {
            branch_id,
            customers,
            total_outstanding_cents: total.cents(),
        }
    }
}

/// One invoice line in a daybook.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DaybookEntry {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub sales_order_id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub subtotal_cents: i64,
    pub gst_cents: i64,
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Invoices raised on one calendar day (UTC).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Daybook {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub entries: Vec<DaybookEntry>,
    pub invoice_count: i64,
    pub subtotal_cents: i64,
    pub gst_cents: i64,
    pub total_cents: i64,
}

impl Daybook {
    pub fn new(date: NaiveDate, entries: Vec<DaybookEntry>) -> Self {
        let (subtotal, gst, total) = entries.iter().fold(
            (Money::zero(), Money::zero(), Money::zero()),
            |(s, g, t), e| {
                (
                    s + Money::from_cents(e.subtotal_cents),
                    g + Money::from_cents(e.gst_cents),
                    t + Money::from_cents(e.total_cents),
                )
            },
        );

        Daybook {
            date,
            invoice_count: entries.len() as i64,
            entries,
            subtotal_cents: subtotal.cents(),
            gst_cents: gst.cents(),
            total_cents: total.cents(),
        }
    }
}

/// A customer's account position and latest invoices.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerStatement {
    pub customer: Customer,
    /// Limit minus outstanding. Negative when over the limit.
    pub available_credit_cents: i64,
    pub recent_invoices: Vec<Invoice>,
}

impl CustomerStatement {
    pub fn new(customer: Customer, recent_invoices: Vec<Invoice>) -> Self {
        CustomerStatement {
            available_credit_cents: (customer.credit_limit() - customer.outstanding()).cents(),
            customer,
            recent_invoices,
        }
    }
}
