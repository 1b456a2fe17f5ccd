//! # Error Types
//!
//! Domain-specific error types for grouporder-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  grouporder-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  grouporder-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  grouporder-service errors                                             │
//! │  └── ServiceError     - What an outer surface sees (serialized)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError ← DbError            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The allocation engine itself never fails. Every variant here is raised
//! by a caller that acts on the engine's output or on the order's state.

use thiserror::Error;

use crate::money::Money;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Adding the proposed line item would push the uncapped discount past
    /// the order's `max_discount`.
    ///
    /// ## User Workflow
    /// ```text
    /// Join order (Nasi Goreng x3)
    ///      │
    ///      ▼
    /// preview() → uncapped discount 12.00
    ///      │
    ///      ▼
    /// cap = 10.00 → DiscountCapExceeded { excess: 2.00 }
    ///      │
    ///      ▼
    /// UI shows: "discount cap exceeded by 2.00", user lowers quantity
    /// ```
    #[error("Discount cap exceeded: uncapped discount {uncapped} is over the cap of {cap} by {excess}")]
    DiscountCapExceeded {
        uncapped: Money,
        cap: Money,
        excess: Money,
    },

    /// Line items can only change while the order is open.
    #[error("Order {order_id} is {status}, line items can no longer change")]
    OrderNotOpen { order_id: String, status: OrderStatus },

    /// The order's deadline has passed.
    #[error("Order {order_id} stopped accepting participants at its deadline")]
    DeadlinePassed { order_id: String },

    /// Requested item is not on the order's menu.
    #[error("Menu item '{item_name}' is not on the menu of order {order_id}")]
    MenuItemNotFound { order_id: String, item_name: String },

    /// Line item doesn't belong to the order (or no longer exists).
    #[error("Line item not found: {0}")]
    LineItemNotFound(String),

    /// Only the PIC may perform this operation.
    #[error("User {user_id} is not the person in charge of order {order_id}")]
    NotOrderOwner { order_id: String, user_id: String },

    /// Only the participant who owns the line item (or the PIC) may change it.
    #[error("User {user_id} may not change line item {line_item_id}")]
    NotLineItemOwner {
        line_item_id: String,
        user_id: String,
    },

    /// Status change not allowed by the order lifecycle.
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Amount above what the engine accepts.
    #[error("{field} must not exceed {max}")]
    TooLarge { field: String, max: Money },

    /// Duplicate value (e.g., two menu items with the same name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Timestamp must lie in the future.
    #[error("{field} must be in the future")]
    MustBeInFuture { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::DiscountCapExceeded {
            uncapped: Money::from_minor(1200),
            cap: Money::from_minor(1000),
            excess: Money::from_minor(200),
        };
        assert_eq!(
            err.to_string(),
            "Discount cap exceeded: uncapped discount 12.00 is over the cap of 10.00 by 2.00"
        );

        let err = CoreError::OrderNotOpen {
            order_id: "o-1".to_string(),
            status: OrderStatus::Closed,
        };
        assert_eq!(
            err.to_string(),
            "Order o-1 is CLOSED, line items can no longer change"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::Duplicate {
            field: "menu item".to_string(),
            value: "Es Teh".to_string(),
        };
        assert_eq!(err.to_string(), "menu item 'Es Teh' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
