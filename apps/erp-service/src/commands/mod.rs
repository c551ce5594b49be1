//! # Commands
//!
//! Every operation a caller can invoke.
//!
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here
//! ├── order.rs     ◄─── create / approve / confirm / invoice, credit preview
//! ├── inventory.rs ◄─── adjust, transfer, thresholds, stock levels, low stock
//! ├── catalog.rs   ◄─── book titles
//! └── report.rs    ◄─── outstanding, daybook, pending orders, statements, audit
//! ```
//!
//! ## Command Shape
//! ```rust,ignore
//! pub async fn generate_invoice(
//!     erp: &Erp,                  ◄── storage + configuration
//!     actor: &Actor,              ◄── authenticated user, checked once here
//!     request: GenerateInvoiceRequest,
//! ) -> ApiResult<Invoice>
//! ```
//!
//! The permission check happens before any storage access. State changes
//! are audited after they commit.

pub mod catalog;
pub mod inventory;
pub mod order;
pub mod report;
