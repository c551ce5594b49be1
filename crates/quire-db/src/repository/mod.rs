//! # Repository Module
//!
//! Database repository implementations for Quire.
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quire-service command                                                  │
//! │       │  db.invoices().generate(order_id, ...)                          │
//! │       ▼                                                                 │
//! │  ┌──────────────┬──────────────┬───────────────┬──────────────────┐    │
//! │  │ master       │ catalog      │ inventory     │ sales            │    │
//! │  │ branches,    │ book titles  │ adjust,       │ proforma insert, │    │
//! │  │ warehouses,  │              │ transfer,     │ approve, confirm │    │
//! │  │ customers,   │              │ low stock     │                  │    │
//! │  │ users        │              │ stream        │                  │    │
//! │  ├──────────────┼──────────────┼───────────────┼──────────────────┤    │
//! │  │ invoice      │ audit        │ report        │                  │    │
//! │  │ CONFIRMED →  │ append-only  │ outstanding,  │                  │    │
//! │  │ INVOICED     │ log          │ daybook, ...  │                  │    │
//! │  └──────────────┴──────────────┴───────────────┴──────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Multi-step mutations (adjust, transfer, proforma insert, invoice) each
//! run in one transaction. Returning early with an error drops the
//! transaction, which rolls it back.

use std::pin::Pin;

use tokio_stream::Stream;

use crate::error::DbResult;

pub mod audit;
pub mod catalog;
pub mod inventory;
pub mod invoice;
pub mod master;
pub mod report;
pub mod sales;

/// A lazily fetched sequence of rows.
pub type RowStream<'a, T> = Pin<Box<dyn Stream<Item = DbResult<T>> + Send + 'a>>;

pub(crate) const ORDER_COLUMNS: &str = "id, customer_id, status, total_cents, requires_approval, \
     approved_by, created_by, created_at, updated_at, confirmed_at, invoiced_at";

pub(crate) const ORDER_ITEM_COLUMNS: &str = "id, sales_order_id, book_title_id, quantity, \
     selling_price_cents, discount_bps, line_total_cents";

pub(crate) const INVOICE_COLUMNS: &str = "id, sales_order_id, invoice_seq, invoice_number, \
     invoice_type, warehouse_id, subtotal_cents, gst_rate_bps, gst_cents, total_cents, created_at";

pub(crate) const INVENTORY_COLUMNS: &str =
    "book_title_id, warehouse_id, quantity, min_stock, max_stock, updated_at";

pub(crate) const CUSTOMER_COLUMNS: &str = "id, name, gst_number, branch_id, credit_limit_cents, \
     outstanding_cents, discount_bps";
