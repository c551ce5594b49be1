//! # Domain Types
//!
//! Core domain types used throughout Quire.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Branch ──┬── Warehouse ──┐                                            │
//! │           │               ├── InventoryRow (book, warehouse) → qty     │
//! │           │   BookTitle ──┘                                            │
//! │           │                                                             │
//! │           └── Customer ── SalesOrder ──┬── SalesOrderItem (snapshot)   │
//! │                                         └── Invoice (1:1, immutable)    │
//! │                                                                         │
//! │  AuditEntry: append-only, references any of the above by id            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Monetary columns are stored as integer minor units (`*_cents`), discounts
//! and tax rates as basis points (`*_bps`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::permissions::Role;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5% GST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Position of a sales order in its lifecycle.
///
/// ```text
/// PROFORMA ──confirm──► CONFIRMED ──invoice──► INVOICED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Draft order, no commitment, no stock reserved.
    Proforma,
    /// Commercially committed, not yet shipped or billed.
    Confirmed,
    /// Billed and stock-deducted. Terminal.
    Invoiced,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Proforma => "PROFORMA",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Invoiced => "INVOICED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Proforma
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Invoice Type
// =============================================================================

/// Billing mode of an invoice. Each type may carry its own GST rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceType {
    Cash,
    Credit,
    Export,
}

impl InvoiceType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Cash => "CASH",
            InvoiceType::Credit => "CREDIT",
            InvoiceType::Export => "EXPORT",
        }
    }
}

impl fmt::Display for InvoiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reference Data (supplied by master-data services)
// =============================================================================

/// A trading branch. The head office is a branch with `is_head_office` set.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub is_head_office: bool,
}

/// A physical stock location. Belongs to exactly one branch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub branch_id: i64,
}

/// A trade customer with a credit account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub gst_number: Option<String>,
    pub branch_id: i64,
    /// Zero means no limit has been configured.
    pub credit_limit_cents: i64,
    /// Sum of unpaid invoice totals. Only invoicing writes this.
    pub outstanding_cents: i64,
    /// Agreed default discount, applied to lines that request none.
    pub discount_bps: i64,
}

impl Customer {
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    #[inline]
    pub fn outstanding(&self) -> Money {
        Money::from_cents(self.outstanding_cents)
    }

    /// Whether a credit limit has ever been configured.
    #[inline]
    pub fn has_credit_limit(&self) -> bool {
        self.credit_limit_cents > 0
    }
}

/// A user known to the identity service. The core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub branch_id: Option<i64>,
    /// Set for CUSTOMER portal users.
    pub customer_id: Option<i64>,
}

// =============================================================================
// Catalog
// =============================================================================

/// An immutable catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BookTitle {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl BookTitle {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// Input for creating a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewBookTitle {
    pub isbn: String,
    pub title: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub price_cents: i64,
}

// =============================================================================
// Inventory
// =============================================================================

/// Stock of one title in one warehouse. Exactly one row per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InventoryRow {
    pub book_title_id: i64,
    pub warehouse_id: i64,
    /// Never negative.
    pub quantity: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl InventoryRow {
    /// Low-stock predicate: at or under the configured minimum.
    #[inline]
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

// =============================================================================
// Sales Order
// =============================================================================

/// A customer sales order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrder {
    pub id: i64,
    pub customer_id: i64,
    pub status: OrderStatus,
    /// Σ line totals, before GST.
    pub total_cents: i64,
    pub requires_approval: bool,
    /// User who approved an order that required approval.
    pub approved_by: Option<i64>,
    pub created_by: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub invoiced_at: Option<DateTime<Utc>>,
}

impl SalesOrder {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// An order needing approval is cleared once someone approved it.
    #[inline]
    pub fn approval_satisfied(&self) -> bool {
        !self.requires_approval || self.approved_by.is_some()
    }
}

/// A line on a sales order.
///
/// `selling_price_cents` is a snapshot of the catalog price when the order
/// was created; later catalog changes do not reach it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesOrderItem {
    pub id: i64,
    pub sales_order_id: i64,
    pub book_title_id: i64,
    pub quantity: i64,
    pub selling_price_cents: i64,
    pub discount_bps: i64,
    pub line_total_cents: i64,
}

impl SalesOrderItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// An issued invoice. Never updated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: i64,
    pub sales_order_id: i64,
    /// Value drawn from the global invoice sequence.
    pub invoice_seq: i64,
    /// Printed number, e.g. `INV-000042`.
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub warehouse_id: i64,
    /// Order total the tax was computed on.
    pub subtotal_cents: i64,
    pub gst_rate_bps: i64,
    pub gst_cents: i64,
    /// subtotal + gst; the amount added to the customer's outstanding balance.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn gst(&self) -> Money {
        Money::from_cents(self.gst_cents)
    }
}

// =============================================================================
// Audit
// =============================================================================

/// Kind of state change recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Approve,
    Confirm,
    Invoice,
    Adjust,
    Transfer,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Approve => "APPROVE",
            AuditAction::Confirm => "CONFIRM",
            AuditAction::Invoice => "INVOICE",
            AuditAction::Adjust => "ADJUST",
            AuditAction::Transfer => "TRANSFER",
        }
    }
}

/// Entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "PascalCase"))]
#[ts(export)]
pub enum AuditEntity {
    SalesOrder,
    Invoice,
    Inventory,
    BookTitle,
}

impl AuditEntity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::SalesOrder => "SalesOrder",
            AuditEntity::Invoice => "Invoice",
            AuditEntity::Inventory => "Inventory",
            AuditEntity::BookTitle => "BookTitle",
        }
    }
}

/// A stored audit record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: i64,
    pub action: AuditAction,
    pub entity: AuditEntity,
    pub entity_id: String,
    /// JSON text.
    pub details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An audit record waiting to be appended.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: i64,
    pub action: AuditAction,
    pub entity: AuditEntity,
    pub entity_id: String,
    pub details: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(
        user_id: i64,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: impl ToString,
    ) -> Self {
        NewAuditEntry {
            user_id,
            action,
            entity,
            entity_id: entity_id.to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
