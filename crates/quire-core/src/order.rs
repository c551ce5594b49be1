//! # Order Lifecycle
//!
//! Pricing of proforma orders and the order state machine.
//!
//! ## State Machine
//! ```text
//! ┌──────────┐   confirm    ┌───────────┐   invoice    ┌──────────┐
//! │ PROFORMA │ ───────────► │ CONFIRMED │ ───────────► │ INVOICED │
//! └──────────┘              └───────────┘              └──────────┘
//!   credit +                  approval                   stock −,
//!   discount                  enforced                   balance +,
//!   evaluated                                            invoice no.
//! ```
//!
//! No skipping and no backward edges. INVOICED is terminal.
//!
//! Drafting is pure: the caller loads the customer and the referenced
//! titles, this module validates, prices and runs credit control, and the
//! storage layer inserts the result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::credit::{CreditAssessment, CreditDecision, CreditPolicy, DiscountPolicy};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::permissions::Actor;
use crate::types::{BookTitle, Customer, OrderStatus, SalesOrder};
use crate::validation::{validate_order_lines, ValidationResult};

// =============================================================================
// Request / Draft Types
// =============================================================================

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub book_title_id: i64,
    pub quantity: i64,
    /// Requested discount. `None` uses the customer's agreed discount.
    #[serde(default)]
    pub discount_bps: Option<i64>,
}

/// A validated, priced line ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub book_title_id: i64,
    pub quantity: i64,
    pub selling_price_cents: i64,
    pub discount_bps: i64,
    pub line_total_cents: i64,
}

/// A fully evaluated proforma order, not yet stored.
#[derive(Debug, Clone)]
pub struct ProformaDraft {
    pub customer_id: i64,
    pub created_by: i64,
    pub lines: Vec<PricedLine>,
    pub total: Money,
    pub requires_approval: bool,
    pub credit: CreditAssessment,
}

// =============================================================================
// Pricing
// =============================================================================

/// Prices one line: `price × qty` less the discount, rounded half-up.
///
/// ```rust
/// use quire_core::money::Money;
/// use quire_core::order::price_line;
///
/// assert_eq!(price_line(Money::from_cents(4500), 3, 1000).unwrap().cents(), 12150);
/// assert_eq!(price_line(Money::from_cents(999), 1, 0).unwrap().cents(), 999);
/// assert!(price_line(Money::from_cents(i64::MAX / 2), 3, 0).is_err());
/// ```
pub fn price_line(price: Money, qty: i64, discount_bps: i64) -> ValidationResult<Money> {
    let gross = price
        .checked_mul(qty)
        .ok_or_else(|| ValidationError::amount_overflow("line_total"))?;
    Ok(gross.apply_percentage_discount(discount_bps))
}

/// Validates and prices a new order, then runs credit control on its total.
///
/// `books` must contain every title the lines reference; a missing one is
/// reported as `NotFound`. The draft requires approval when any line's
/// discount exceeds the actor's cap or the credit gate asks for it.
pub fn draft_proforma(
    actor: &Actor,
    customer: &Customer,
    books: &[BookTitle],
    lines: &[OrderLineRequest],
    credit_policy: &CreditPolicy,
    discount_policy: &DiscountPolicy,
) -> CoreResult<ProformaDraft> {
    validate_order_lines(lines)?;

    let catalog: HashMap<i64, &BookTitle> = books.iter().map(|b| (b.id, b)).collect();

    let mut priced = Vec::with_capacity(lines.len());
    let mut discount_needs_approval = false;

    for line in lines {
        let book = catalog
            .get(&line.book_title_id)
            .ok_or_else(|| CoreError::not_found("BookTitle", line.book_title_id))?;

        let discount = discount_policy.evaluate(actor.role, customer, line.discount_bps);
        discount_needs_approval |= discount.requires_approval;

        let line_total = price_line(book.price(), line.quantity, discount.applied_bps)?;

        priced.push(PricedLine {
            book_title_id: book.id,
            quantity: line.quantity,
            selling_price_cents: book.price_cents,
            discount_bps: discount.applied_bps,
            line_total_cents: line_total.cents(),
        });
    }

    let total = priced
        .iter()
        .try_fold(Money::zero(), |sum, l| {
            sum.checked_add(Money::from_cents(l.line_total_cents))
        })
        .ok_or_else(|| ValidationError::amount_overflow("total"))?;

    let credit = credit_policy.evaluate(customer, total)?;
    if credit.decision == CreditDecision::Reject {
        return Err(CoreError::CreditRejected {
            customer_id: customer.id,
            reason: format!(
                "no credit limit configured; order total {} cannot be accepted",
                total
            ),
        });
    }

    Ok(ProformaDraft {
        customer_id: customer.id,
        created_by: actor.user_id,
        lines: priced,
        total,
        requires_approval: discount_needs_approval || credit.decision.requires_approval(),
        credit,
    })
}

// =============================================================================
// Transitions
// =============================================================================

impl OrderStatus {
    /// The single status reachable from this one, if any.
    pub const fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Proforma => Some(OrderStatus::Confirmed),
            OrderStatus::Confirmed => Some(OrderStatus::Invoiced),
            OrderStatus::Invoiced => None,
        }
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        self.next() == Some(to)
    }
}

/// Checks that `from → to` is an edge of the state machine.
///
/// Asking to invoice an order that is already invoiced is reported as
/// `AlreadyInvoiced`, every other illegal edge as `InvalidTransition`.
pub fn ensure_transition(order_id: i64, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
    if from.can_transition_to(to) {
        return Ok(());
    }

    if from == OrderStatus::Invoiced && to == OrderStatus::Invoiced {
        return Err(CoreError::AlreadyInvoiced { order_id });
    }

    Err(CoreError::InvalidTransition { order_id, from, to })
}

/// Checks that an order may be confirmed now.
///
/// `approver_present` is true when a privileged approver accompanies the
/// confirmation request.
pub fn ensure_confirmable(order: &SalesOrder, approver_present: bool) -> CoreResult<()> {
    ensure_transition(order.id, order.status, OrderStatus::Confirmed)?;

    if !order.approval_satisfied() && !approver_present {
        return Err(CoreError::ApprovalRequired { order_id: order.id });
    }

    Ok(())
}

/// Checks that an order may be approved: it must still be a proforma.
pub fn ensure_approvable(order: &SalesOrder) -> CoreResult<()> {
    if order.status != OrderStatus::Proforma {
        return Err(CoreError::InvalidTransition {
            order_id: order.id,
            from: order.status,
            to: OrderStatus::Confirmed,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
