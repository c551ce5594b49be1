//! # Error Types
//!
//! Business error taxonomy for quire-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quire-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule failures (typed, recoverable)    │
//! │  └── ValidationError  - Malformed input, fixable by the caller         │
//! │                                                                         │
//! │  quire-db errors                                                       │
//! │  └── DbError          - Storage failures, wraps CoreError raised       │
//! │                         inside a transaction                           │
//! │                                                                         │
//! │  quire-service errors                                                  │
//! │  └── ApiError         - What the HTTP layer sees (code + message)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::permissions::{Capability, Role};
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures.
///
/// Every variant is returned to the caller as a typed result. None of them
/// leaves a partial state change behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or missing input.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A stock decrement would take a row below zero.
    ///
    /// ## User Workflow
    /// ```text
    /// Generate invoice (3 × "Effective Java" from Central Warehouse)
    ///      │
    ///      ▼
    /// Row (book 7, warehouse 1): quantity = 1
    ///      │
    ///      ▼
    /// InsufficientStock { book 7, warehouse 1, available 1, requested 3 }
    ///      │
    ///      ▼
    /// Caller retries with another warehouse or a smaller order
    /// ```
    #[error(
        "Insufficient stock for book {book_title_id} in warehouse {warehouse_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        book_title_id: i64,
        warehouse_id: i64,
        available: i64,
        requested: i64,
    },

    /// The order needs a privileged approval before it can be confirmed.
    #[error("Sales order {order_id} requires approval before confirmation")]
    ApprovalRequired { order_id: i64 },

    /// An invoice already exists for the order.
    #[error("Sales order {order_id} is already invoiced")]
    AlreadyInvoiced { order_id: i64 },

    /// The requested status change is not an edge of the order state machine.
    #[error("Sales order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// The acting user's role lacks the capability.
    #[error("Role {role} is not allowed to {capability}")]
    PermissionDenied { role: Role, capability: Capability },

    /// Credit control refused the order outright.
    #[error("Credit rejected for customer {customer_id}: {reason}")]
    CreditRejected { customer_id: i64, reason: String },
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any storage is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed ISBN).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate ISBN).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Two fields that must differ are equal.
    #[error("{first} and {second} must differ")]
    MustDiffer { first: String, second: String },
}

impl ValidationError {
    /// An amount whose arithmetic left the `i64` range.
    pub fn amount_overflow(field: impl Into<String>) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min: i64::MIN,
            max: i64::MAX,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
