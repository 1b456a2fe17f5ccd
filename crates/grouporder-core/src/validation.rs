//! # Validation Module
//!
//! Boundary validation for everything that reaches the allocation engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend form                                                 │
//! │  ├── Required fields, min/max                                          │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: grouporder-service                                           │
//! │  └── THIS MODULE: typed values checked before the engine or the        │
//! │      database sees them                                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity > 0), status enums                                │
//! │  └── UNIQUE (order_id, user_id, item_name)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine trusts its input (`item_price >= 0`, `quantity > 0`); this
//! module is where that trust is earned.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{DiscountRate, MenuItem, NewOrder, PricingRules};
use crate::{MAX_AMOUNT_MINOR, MAX_ITEM_QUANTITY, MAX_MENU_ITEMS, MAX_NAME_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required, length-limited text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use grouporder_core::validation::validate_name;
///
/// assert_eq!(validate_name("title", "  Friday lunch ").unwrap(), "Friday lunch");
/// assert!(validate_name("title", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity submitted by a participant.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// Quantity edits of zero or less are not validated here: they mean
/// "remove the line item" and are routed to deletion by the service.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price, fee, cap or threshold.
///
/// ## Rules
/// - Must not be negative (zero is allowed)
/// - Must not exceed MAX_AMOUNT_MINOR, so totals cannot overflow
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    if amount.minor_units() > MAX_AMOUNT_MINOR {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: Money::from_minor(MAX_AMOUNT_MINOR),
        });
    }

    Ok(())
}

/// Validates a discount rate (0% to 100%).
pub fn validate_discount_rate(rate: DiscountRate) -> ValidationResult<()> {
    if rate.bps() > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "discount_percentage".to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Validates all pricing rules of an order.
pub fn validate_pricing(rules: &PricingRules) -> ValidationResult<()> {
    validate_amount("service_and_delivery_fee", rules.service_and_delivery_fee)?;
    validate_discount_rate(rules.discount_rate)?;
    if let Some(cap) = rules.max_discount {
        validate_amount("max_discount", cap)?;
    }
    validate_amount("min_order_for_discount", rules.min_order_for_discount)?;
    Ok(())
}

// =============================================================================
// Menu and Order Validators
// =============================================================================

/// Validates a menu and returns it with trimmed names.
///
/// ## Rules
/// - At least one entry, at most MAX_MENU_ITEMS
/// - Every name present and unique (exact match after trimming)
/// - Every price non-negative and within MAX_AMOUNT_MINOR (free items are allowed)
pub fn validate_menu(menu: &[MenuItem]) -> ValidationResult<Vec<MenuItem>> {
    if menu.is_empty() {
        return Err(ValidationError::Required {
            field: "menu".to_string(),
        });
    }

    if menu.len() > MAX_MENU_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "menu items".to_string(),
            min: 1,
            max: MAX_MENU_ITEMS as i64,
        });
    }

    let mut cleaned: Vec<MenuItem> = Vec::with_capacity(menu.len());
    for item in menu {
        let name = validate_name("menu item name", &item.name)?;
        validate_amount("menu item price", item.price)?;

        if cleaned.iter().any(|existing| existing.name == name) {
            return Err(ValidationError::Duplicate {
                field: "menu item".to_string(),
                value: name,
            });
        }
        cleaned.push(MenuItem::new(name, item.price));
    }

    Ok(cleaned)
}

/// Validates that a deadline lies after `now`.
pub fn validate_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult<()> {
    if deadline <= now {
        return Err(ValidationError::MustBeInFuture {
            field: "deadline".to_string(),
        });
    }

    Ok(())
}

/// Validates a complete order draft and returns its cleaned form.
pub fn validate_new_order(draft: &NewOrder, now: DateTime<Utc>) -> ValidationResult<NewOrder> {
    let title = validate_name("title", &draft.title)?;
    let store_name = validate_name("store_name", &draft.store_name)?;
    validate_deadline(draft.deadline, now)?;
    let menu = validate_menu(&draft.menu)?;
    validate_pricing(&draft.pricing)?;

    Ok(NewOrder {
        title,
        store_name,
        deadline: draft.deadline,
        menu,
        pricing: draft.pricing,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
