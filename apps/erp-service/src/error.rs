//! # API Error Type
//!
//! Unified error type for workflow commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Quire                                  │
//! │                                                                         │
//! │  Command Function  ── Result<T, ApiError>                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Permission check? ─── CoreError::PermissionDenied ───────┐            │
//! │         │                                                 │            │
//! │         ▼                                                 ▼            │
//! │  Validation?       ─── CoreError::Validation ─────────► ApiError ────► │
//! │         │                                                 ▲            │
//! │         ▼                                                 │            │
//! │  Transaction       ─── DbError::Domain(InsufficientStock) ┤            │
//! │                    ─── DbError::QueryFailed ── (logged) ──┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Business-rule failures keep their own code; storage failures all become
//! `INTERNAL_ERROR` with a generic message, the detail going to the log.

use serde::Serialize;
use ts_rs::TS;

use quire_core::{CoreError, ValidationError};
use quire_db::DbError;

/// Error returned from every command.
///
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for book 7 in warehouse 1: available 1, requested 3"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed
    ValidationError,

    /// Referenced entity does not exist
    NotFound,

    /// A stock decrement would go below zero
    InsufficientStock,

    /// Order needs approval before confirmation
    ApprovalRequired,

    /// Order already has an invoice
    AlreadyInvoiced,

    /// Status change not allowed from the current state
    InvalidTransition,

    /// Actor's role lacks the capability
    PermissionDenied,

    /// Credit control refused the order
    CreditRejected,

    /// Storage or other unexpected failure
    InternalError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id.to_string()),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InternalError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::ApprovalRequired { .. } => ErrorCode::ApprovalRequired,
            CoreError::AlreadyInvoiced { .. } => ErrorCode::AlreadyInvoiced,
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            CoreError::CreditRejected { .. } => ErrorCode::CreditRejected,
        };

        match err {
            // Drop the "Validation error: " prefix; the code already says it.
            CoreError::Validation(e) => ApiError::new(code, e.to_string()),
            other => ApiError::new(code, other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Domain(e) => ApiError::from(e),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, id),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::internal("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::internal("Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::internal("Database busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;
