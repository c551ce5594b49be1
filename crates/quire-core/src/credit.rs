//! # Credit Control
//!
//! Decides whether a customer may take on a new order, and whether a
//! requested line discount is within what the acting role may grant.
//!
//! ## Credit Gate
//! ```text
//! projected = outstanding + order total
//!
//!   projected <= limit ──────────────► ACCEPT
//!   limit == 0 (never configured) ───► UnsetLimitPolicy
//!                                       ├─ RequireApproval → ACCEPT_WITH_APPROVAL
//!                                       └─ Reject          → REJECT
//!   otherwise ───────────────────────► ACCEPT_WITH_APPROVAL
//! ```
//!
//! Both checks are read-only. Neither touches inventory nor the customer
//! balance.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::permissions::Role;
use crate::types::Customer;
use crate::validation::ValidationResult;

// =============================================================================
// Credit Policy
// =============================================================================

/// What to do with a customer whose credit limit was never configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsetLimitPolicy {
    /// Accept, but the order needs a privileged approval.
    #[default]
    RequireApproval,
    /// Refuse the order.
    Reject,
}

impl FromStr for UnsetLimitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approval" | "require_approval" => Ok(UnsetLimitPolicy::RequireApproval),
            "reject" => Ok(UnsetLimitPolicy::Reject),
            other => Err(format!("expected 'approval' or 'reject', got '{other}'")),
        }
    }
}

/// Outcome of a credit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditDecision {
    Accept,
    AcceptWithApproval,
    Reject,
}

impl CreditDecision {
    #[inline]
    pub fn requires_approval(&self) -> bool {
        matches!(self, CreditDecision::AcceptWithApproval)
    }
}

/// Full result of a credit evaluation, returned by the credit preview.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreditAssessment {
    pub customer_id: i64,
    pub decision: CreditDecision,
    pub credit_limit_cents: i64,
    pub outstanding_cents: i64,
    pub order_total_cents: i64,
    pub projected_cents: i64,
    /// Headroom left after the order. Negative when over the limit.
    pub available_cents: i64,
}

/// Credit control settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditPolicy {
    pub unset_limit: UnsetLimitPolicy,
}

impl CreditPolicy {
    pub fn new(unset_limit: UnsetLimitPolicy) -> Self {
        CreditPolicy { unset_limit }
    }

    /// Evaluates a prospective order total against the customer's account.
    ///
    /// ```rust
    /// use quire_core::credit::{CreditDecision, CreditPolicy};
    /// # use quire_core::types::Customer;
    /// # use quire_core::money::Money;
    /// # let customer = Customer {
    /// #     id: 1, name: "Lotus Books".into(), gst_number: None, branch_id: 1,
    /// #     credit_limit_cents: 100_000, outstanding_cents: 90_000, discount_bps: 0,
    /// # };
    /// let policy = CreditPolicy::default();
    /// let ok = policy.evaluate(&customer, Money::from_cents(5_000)).unwrap();
    /// assert_eq!(ok.decision, CreditDecision::Accept);
    ///
    /// let over = policy.evaluate(&customer, Money::from_cents(20_000)).unwrap();
    /// assert_eq!(over.decision, CreditDecision::AcceptWithApproval);
    /// ```
    ///
    /// A projection that leaves the `i64` range is an `OutOfRange` error.
    pub fn evaluate(
        &self,
        customer: &Customer,
        order_total: Money,
    ) -> ValidationResult<CreditAssessment> {
        let limit = customer.credit_limit();
        let outstanding = customer.outstanding();
        let projected = outstanding
            .checked_add(order_total)
            .ok_or_else(|| ValidationError::amount_overflow("projected"))?;
        let available = limit
            .checked_sub(projected)
            .ok_or_else(|| ValidationError::amount_overflow("available"))?;

        let decision = if projected <= limit {
            CreditDecision::Accept
        } else if !customer.has_credit_limit() {
            match self.unset_limit {
                UnsetLimitPolicy::RequireApproval => CreditDecision::AcceptWithApproval,
                UnsetLimitPolicy::Reject => CreditDecision::Reject,
            }
        } else {
            CreditDecision::AcceptWithApproval
        };

        Ok(CreditAssessment {
            customer_id: customer.id,
            decision,
            credit_limit_cents: limit.cents(),
            outstanding_cents: outstanding.cents(),
            order_total_cents: order_total.cents(),
            projected_cents: projected.cents(),
            available_cents: available.cents(),
        })
    }
}

// =============================================================================
// Discount Policy
// =============================================================================

/// Maximum discount each role may grant without approval, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPolicy {
    pub admin_cap_bps: i64,
    pub ho_cap_bps: i64,
    pub branch_cap_bps: i64,
    pub sales_cap_bps: i64,
    pub customer_cap_bps: i64,
}

impl Default for DiscountPolicy {
    fn default() -> Self {
        DiscountPolicy {
            admin_cap_bps: 10_000,
            ho_cap_bps: 5_000,
            branch_cap_bps: 2_500,
            sales_cap_bps: 1_000,
            customer_cap_bps: 0,
        }
    }
}

/// Result of checking one requested discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountDecision {
    /// Discount that will be written on the line.
    pub applied_bps: i64,
    /// Cap in force for this actor and customer.
    pub cap_bps: i64,
    pub requires_approval: bool,
}

impl DiscountPolicy {
    pub fn cap_for(&self, role: Role) -> i64 {
        match role {
            Role::Admin => self.admin_cap_bps,
            Role::Ho => self.ho_cap_bps,
            Role::Branch => self.branch_cap_bps,
            Role::Sales => self.sales_cap_bps,
            Role::Customer => self.customer_cap_bps,
        }
    }

    /// Checks a requested discount for one line.
    ///
    /// A missing request falls back to the customer's agreed discount. The
    /// agreed discount is always within cap; anything above both the role
    /// cap and the agreed discount is kept but flags the order for approval.
    pub fn evaluate(
        &self,
        role: Role,
        customer: &Customer,
        requested_bps: Option<i64>,
    ) -> DiscountDecision {
        let cap_bps = self.cap_for(role).max(customer.discount_bps);
        let applied_bps = requested_bps.unwrap_or(customer.discount_bps);

        DiscountDecision {
            applied_bps,
            cap_bps,
            requires_approval: applied_bps > cap_bps,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
