//! # quire-core: Pure Business Logic for Quire ERP
//!
//! This crate holds every business rule of the order-to-invoice workflow as
//! pure functions. Storage, configuration loading and logging setup live in
//! `quire-db` and `quire-service`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quire ERP Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP layer / web client (external)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON views                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 quire-service (workflow boundary)               │   │
//! │  │    create_order, confirm_order, generate_invoice, transfer     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quire-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  types  │ │  money  │ │ credit  │ │  order  │ │ invoice │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    quire-db (Database Layer)                    │   │
//! │  │          SQLite transactions, migrations, repositories          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities (BookTitle, Customer, SalesOrder, Invoice, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Business error taxonomy
//! - [`validation`] - Input validation
//! - [`credit`] - Credit control and discount caps
//! - [`order`] - Order pricing and the PROFORMA → CONFIRMED → INVOICED machine
//! - [`invoice`] - GST rate table and invoice numbering
//! - [`permissions`] - Roles, capabilities and the acting user
//! - [`views`] - JSON views produced for the presentation layer
//!
//! ## Example Usage
//!
//! ```rust
//! use quire_core::money::Money;
//! use quire_core::order::price_line;
//!
//! // 3 copies at 45.00 with a 10% discount
//! let line = price_line(Money::from_cents(4500), 3, 1000).unwrap();
//! assert_eq!(line.cents(), 12150);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod credit;
pub mod error;
pub mod invoice;
pub mod money;
pub mod order;
pub mod permissions;
pub mod types;
pub mod validation;
pub mod views;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use credit::{
    CreditAssessment, CreditDecision, CreditPolicy, DiscountDecision, DiscountPolicy,
    UnsetLimitPolicy,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceTotals, TaxTable};
pub use money::Money;
pub use order::{OrderLineRequest, PricedLine, ProformaDraft};
pub use permissions::{Actor, Capability, Role};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed on a single sales order.
pub const MAX_ORDER_LINES: usize = 200;

/// Maximum quantity of a single title on one order line.
///
/// ## Business Reason
/// Catches keying mistakes (10000 instead of 100) on bulk distributor orders.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// One hundred percent, in basis points.
pub const FULL_PERCENT_BPS: i64 = 10_000;

/// Highest catalog price in minor units (100 million in major units).
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Highest amount a single order can reach: every line at the maximum
/// price and quantity.
pub const MAX_ORDER_TOTAL_CENTS: i64 = MAX_PRICE_CENTS * MAX_LINE_QUANTITY * MAX_ORDER_LINES as i64;

/// Largest stock change a single adjustment may apply, in either direction.
pub const MAX_STOCK_DELTA: i64 = 1_000_000;
