//! # Validation Module
//!
//! Input validation for Quire. Every check here runs before storage is
//! touched, so a failure never leaves a partial state change behind.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Workflow boundary (quire-service)                            │
//! │  └── THIS MODULE: shape of the request (ids, quantities, discounts)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Business rules (credit, order)                               │
//! │  └── caps, approval flags, state machine                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── UNIQUE (isbn), UNIQUE (sales_order_id), UNIQUE (invoice_number)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quire_core::validation::{validate_isbn, validate_quantity};
//!
//! assert!(validate_isbn("978-0134685991").is_ok());
//! assert!(validate_quantity(3).is_ok());
//! ```

use crate::error::ValidationError;
use crate::order::OrderLineRequest;
use crate::{
    FULL_PERCENT_BPS, MAX_LINE_QUANTITY, MAX_ORDER_LINES, MAX_ORDER_TOTAL_CENTS, MAX_PRICE_CENTS,
    MAX_STOCK_DELTA,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an ISBN-10 or ISBN-13.
///
/// Hyphens and spaces are ignored. An ISBN-10 may end in `X`.
///
/// ```rust
/// use quire_core::validation::validate_isbn;
///
/// assert!(validate_isbn("978-0201633610").is_ok());
/// assert!(validate_isbn("0-201-63361-X").is_ok());
/// assert!(validate_isbn("").is_err());
/// assert!(validate_isbn("978-01346").is_err());
/// ```
pub fn validate_isbn(isbn: &str) -> ValidationResult<()> {
    let isbn = isbn.trim();

    if isbn.is_empty() {
        return Err(ValidationError::Required {
            field: "isbn".to_string(),
        });
    }

    let compact: Vec<char> = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();

    let well_formed = match compact.len() {
        13 => compact.iter().all(char::is_ascii_digit),
        10 => {
            compact[..9].iter().all(char::is_ascii_digit)
                && (compact[9].is_ascii_digit() || compact[9] == 'X' || compact[9] == 'x')
        }
        _ => false,
    };

    if !well_formed {
        return Err(ValidationError::InvalidFormat {
            field: "isbn".to_string(),
            reason: "must be 10 or 13 digits, optionally separated by hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a book title.
///
/// ## Rules
/// - Must not be empty
/// - At most 300 characters
pub fn validate_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.chars().count() > 300 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 300,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (9999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed (complimentary copies).
///
/// ```rust
/// use quire_core::validation::validate_price_cents;
/// use quire_core::MAX_PRICE_CENTS;
///
/// assert!(validate_price_cents(4500).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates an order amount in minor units, such as a credit preview total.
pub fn validate_order_total_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_ORDER_TOTAL_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "order_total".to_string(),
            min: 0,
            max: MAX_ORDER_TOTAL_CENTS,
        });
    }

    Ok(())
}

/// Validates a discount in basis points (0 to 10000).
pub fn validate_discount_bps(bps: i64) -> ValidationResult<()> {
    if !(0..=FULL_PERCENT_BPS).contains(&bps) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: FULL_PERCENT_BPS,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps as i64 > FULL_PERCENT_BPS {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: FULL_PERCENT_BPS,
        });
    }

    Ok(())
}

/// Validates a signed stock adjustment. Zero changes nothing and is refused.
///
/// ```rust
/// use quire_core::validation::validate_stock_delta;
/// use quire_core::MAX_STOCK_DELTA;
///
/// assert!(validate_stock_delta(-MAX_STOCK_DELTA).is_ok());
/// assert!(validate_stock_delta(i64::MIN).is_err());
/// ```
pub fn validate_stock_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 {
        return Err(ValidationError::InvalidFormat {
            field: "delta".to_string(),
            reason: "must not be zero".to_string(),
        });
    }

    if delta.unsigned_abs() > MAX_STOCK_DELTA as u64 {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_STOCK_DELTA,
            max: MAX_STOCK_DELTA,
        });
    }

    Ok(())
}

/// Validates min/max stock thresholds.
pub fn validate_thresholds(min_stock: i64, max_stock: i64) -> ValidationResult<()> {
    if min_stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "min_stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if max_stock < min_stock {
        return Err(ValidationError::OutOfRange {
            field: "max_stock".to_string(),
            min: min_stock,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates a transfer request before any row is read.
///
/// ```rust
/// use quire_core::validation::validate_transfer;
///
/// assert!(validate_transfer(1, 2, 5).is_ok());
/// assert!(validate_transfer(1, 1, 5).is_err());
/// assert!(validate_transfer(1, 2, 0).is_err());
/// ```
pub fn validate_transfer(
    source_warehouse_id: i64,
    target_warehouse_id: i64,
    quantity: i64,
) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if source_warehouse_id == target_warehouse_id {
        return Err(ValidationError::MustDiffer {
            first: "source warehouse".to_string(),
            second: "target warehouse".to_string(),
        });
    }

    Ok(())
}

/// Validates the shape of an order's line list.
///
/// Pricing and book existence are checked later, against reference data.
pub fn validate_order_lines(lines: &[OrderLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
        if let Some(bps) = line.discount_bps {
            validate_discount_bps(bps)?;
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
