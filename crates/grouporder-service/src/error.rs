//! # Service Error Type
//!
//! Unified error type for every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Group Order                            │
//! │                                                                         │
//! │  Caller (web handler)           grouporder-service                     │
//! │  ────────────────────           ──────────────────                     │
//! │                                                                         │
//! │  join_order(...)                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, ServiceError>                                         │  │
//! │  │         │                                                        │  │
//! │  │  Database Error? ─── DbError::NotFound ──────────┐               │  │
//! │  │         │                                        │               │  │
//! │  │  Rule violated? ──── CoreError::DiscountCap... ──┴─► ServiceError │  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "DISCOUNT_CAP_EXCEEDED",                                     │
//! │    "message": "Discount cap exceeded: ... by 2.00" }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Database internals never leak into `message`; they are logged instead.

use grouporder_core::{CoreError, ValidationError};
use grouporder_db::DbError;
use serde::Serialize;
use ts_rs::TS;

/// Error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 1b4e28ba-2fa1-11d2-883f-0016d3cca427"
/// }
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ServiceError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for service responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Order, line item or menu item doesn't exist (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Joining would push the discount past the order's cap (422)
    DiscountCapExceeded,

    /// Actor is neither the PIC nor the line item owner (403)
    Forbidden,

    /// Order is no longer open, or its deadline has passed (409)
    OrderClosed,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ServiceError {
    /// Creates a new service error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ServiceError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ServiceError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ServiceError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to service errors.
///
/// Missing rows and constraint rejections are the caller's problem and say
/// so. Everything else is an infrastructure failure: logged in full, then
/// reported with a fixed message.
impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        let public = match &err {
            DbError::NotFound { entity, id } => return ServiceError::not_found(entity, id),
            DbError::UniqueViolation { field, .. } => {
                return ServiceError::validation(format!("{} must be unique", field))
            }
            DbError::ForeignKeyViolation { .. } => {
                return ServiceError::validation("Invalid reference")
            }
            DbError::CheckViolation { .. } => return ServiceError::validation("Value out of range"),
            DbError::ConnectionFailed(_) => "Database connection failed",
            DbError::MigrationFailed(_) => "Database migration failed",
            DbError::TransactionFailed(_) => "Database transaction failed",
            DbError::PoolExhausted => "Database busy, try again",
            DbError::QueryFailed(_) | DbError::Internal(_) => "Database operation failed",
        };

        tracing::error!(error = %err, "Database failure");
        ServiceError::new(ErrorCode::DatabaseError, public)
    }
}

/// Converts core errors to service errors.
impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::DiscountCapExceeded { .. } => ErrorCode::DiscountCapExceeded,
            CoreError::OrderNotOpen { .. }
            | CoreError::DeadlinePassed { .. }
            | CoreError::InvalidStatusTransition { .. } => ErrorCode::OrderClosed,
            CoreError::MenuItemNotFound { .. } | CoreError::LineItemNotFound(_) => {
                ErrorCode::NotFound
            }
            CoreError::NotOrderOwner { .. } | CoreError::NotLineItemOwner { .. } => {
                ErrorCode::Forbidden
            }
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        match err {
            CoreError::Validation(e) => ServiceError::new(code, e.to_string()),
            other => ServiceError::new(code, other.to_string()),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::validation(err.to_string())
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
