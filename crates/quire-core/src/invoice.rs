//! # Invoicing Rules
//!
//! GST rate table and invoice totals. The invoice counter itself lives in
//! storage; this module only formats the number it hands out.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{InvoiceType, TaxRate};

/// Default prefix for printed invoice numbers.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

// =============================================================================
// Tax Table
// =============================================================================

/// GST rate per invoice type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxTable {
    pub cash: TaxRate,
    pub credit: TaxRate,
    /// Exports are zero-rated unless configured otherwise.
    pub export: TaxRate,
}

impl Default for TaxTable {
    fn default() -> Self {
        TaxTable {
            cash: TaxRate::from_bps(500),
            credit: TaxRate::from_bps(500),
            export: TaxRate::zero(),
        }
    }
}

impl TaxTable {
    pub fn rate_for(&self, invoice_type: InvoiceType) -> TaxRate {
        match invoice_type {
            InvoiceType::Cash => self.cash,
            InvoiceType::Credit => self.credit,
            InvoiceType::Export => self.export,
        }
    }
}

// =============================================================================
// Invoice Totals
// =============================================================================

/// Amounts printed on an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub gst_rate: TaxRate,
    pub gst: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Computes GST on the order total for the given invoice type.
    ///
    /// ```rust
    /// use quire_core::invoice::{InvoiceTotals, TaxTable};
    /// use quire_core::money::Money;
    /// use quire_core::types::InvoiceType;
    ///
    /// let totals = InvoiceTotals::compute(Money::from_cents(12150), InvoiceType::Cash, &TaxTable::default());
    /// assert_eq!(totals.gst.cents(), 608);
    /// assert_eq!(totals.total.cents(), 12758);
    /// ```
    pub fn compute(subtotal: Money, invoice_type: InvoiceType, table: &TaxTable) -> Self {
        let gst_rate = table.rate_for(invoice_type);
        let gst = subtotal.calculate_tax(gst_rate);

        InvoiceTotals {
            subtotal,
            gst_rate,
            gst,
            total: subtotal + gst,
        }
    }
}

/// Formats a sequence value as a printed invoice number.
///
/// Zero-padding keeps lexical order equal to numeric order up to a million
/// invoices.
///
/// ```rust
/// use quire_core::invoice::format_invoice_number;
///
/// assert_eq!(format_invoice_number("INV", 42), "INV-000042");
/// ```
pub fn format_invoice_number(prefix: &str, seq: i64) -> String {
    format!("{prefix}-{seq:06}")
}
