//! # Money Module
//!
//! Provides the `Money` type for every price, balance, discount and tax
//! amount in Quire.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Customer.outstandingAmount as a float:                                 │
//! │    900.10 + 121.50 + 6.08 = 1027.6799999999998                          │
//! │                                                                         │
//! │  Credit check: projected <= creditLimit compares noise, not money.      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise / cents)                     │
//! │    90010 + 12150 + 608 = 102768  (exact, comparable, summable)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quire_core::money::Money;
//!
//! let price = Money::from_cents(4500);        // 45.00
//! let gross = price * 3;                      // 135.00
//! let net = gross.apply_percentage_discount(1000); // 10% off
//! assert_eq!(net.cents(), 12150);             // 121.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// BookTitle.price ──► SalesOrderItem.selling_price (snapshot)
///                            │
///                            ▼ × quantity − discount
///                     SalesOrderItem.line_total ──Σ──► SalesOrder.total
///                                                           │
///                                         + GST (rate by invoice type)
///                                                           ▼
///                                                    Invoice.total ──► Customer.outstanding
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use quire_core::money::Money;
    ///
    /// let price = Money::from_cents(4500);
    /// assert_eq!(price.cents(), 4500);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ```rust
    /// use quire_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(121, 50).cents(), 12150);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `bps / 10000` of this amount, rounded half-up on the minor unit.
    ///
    /// Shared by discount and tax arithmetic so both round the same way.
    ///
    /// ```rust
    /// use quire_core::money::Money;
    ///
    /// // 121.50 at 5% = 6.075 → 6.08
    /// assert_eq!(Money::from_cents(12150).percent_of(500).cents(), 608);
    /// ```
    pub fn percent_of(&self, bps: i64) -> Money {
        // i128 keeps large order totals from overflowing the product
        let scaled = self.0 as i128 * bps as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        Money(rounded as i64)
    }

    /// Calculates tax at the given rate.
    ///
    /// ```rust
    /// use quire_core::money::Money;
    /// use quire_core::types::TaxRate;
    ///
    /// let gst = Money::from_cents(12150).calculate_tax(TaxRate::from_bps(500));
    /// assert_eq!(gst.cents(), 608);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percent_of(rate.bps() as i64)
    }

    /// Multiplies by a quantity, or `None` when the product does not fit.
    ///
    /// ```rust
    /// use quire_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(4500).checked_mul(3), Some(Money::from_cents(13500)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).checked_mul(3), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (1000 = 10%)
    pub fn apply_percentage_discount(&self, discount_bps: i64) -> Money {
        *self - self.percent_of(discount_bps)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering for logs. Currency symbols belong to the client.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents_parts() {
        let money = Money::from_cents(12150);
        assert_eq!(money.major(), 121);
        assert_eq!(money.minor(), 50);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(12150).to_string(), "121.50");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_discount_on_line() {
        // 3 × 45.00 at 10% = 121.50
        let gross = Money::from_cents(4500) * 3;
        assert_eq!(gross.apply_percentage_discount(1000).cents(), 12150);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        // 0.825 → 0.83
        assert_eq!(Money::from_cents(1000).percent_of(825).cents(), 83);
        // 0.824 → 0.82
        assert_eq!(Money::from_cents(1000).percent_of(824).cents(), 82);
        // negative amounts round away from zero symmetrically
        assert_eq!(Money::from_cents(-1000).percent_of(825).cents(), -83);
    }

    #[test]
    fn test_tax_calculation() {
        let rate = TaxRate::from_bps(1200);
        assert_eq!(Money::from_cents(10000).calculate_tax(rate).cents(), 1200);
        assert!(Money::from_cents(10000).calculate_tax(TaxRate::zero()).is_zero());
    }

    #[test]
    fn test_checked_arithmetic_at_the_edges() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(max.checked_add(Money::zero()), Some(max));
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)), None);
        assert_eq!(Money::from_cents(i64::MAX / 2).checked_mul(3), None);
        assert_eq!(
            Money::from_cents(crate::MAX_PRICE_CENTS).checked_mul(crate::MAX_LINE_QUANTITY),
            Some(Money::from_cents(crate::MAX_PRICE_CENTS * crate::MAX_LINE_QUANTITY))
        );
    }

    #[test]
    fn test_percent_of_large_amounts() {
        // the i128 intermediate keeps this exact
        let total = Money::from_cents(crate::MAX_ORDER_TOTAL_CENTS);
        assert_eq!(total.percent_of(10_000), total);
        assert!(total.apply_percentage_discount(10_000).is_zero());
    }

    #[test]
    fn test_full_discount_is_zero() {
        let line = Money::from_cents(4999).apply_percentage_discount(10_000);
        assert!(line.is_zero());
    }
}
