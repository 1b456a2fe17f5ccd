//! # Domain Types
//!
//! Core domain types used throughout Group Order.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │    LineItem     │   │    MenuItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │──►│  order_id (FK)  │   │  name (unique)  │       │
//! │  │  created_by PIC │   │  user_id        │   │  price          │       │
//! │  │  status         │   │  item snapshot  │   └─────────────────┘       │
//! │  │  pricing rules  │   │  quantity       │                             │
//! │  │  menu           │   │  payment_status │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │  OrderStatus    │   │ PaymentStatus   │       │
//! │  │  bps (u32)      │   │  Open           │   │  Unpaid         │       │
//! │  │  1000 = 10%     │   │  Closed         │   │  Paid           │       │
//! │  └─────────────────┘   │  Canceled       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1000 bps = 10% and 10000 bps = 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a discount rate from a percentage (e.g. `12.5` → 1250 bps).
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle state of an order.
///
/// ```text
///          close_order
///   OPEN ──────────────► CLOSED
///     │
///     │    cancel_order
///     └────────────────► CANCELED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Participants may join and edit their line items.
    Open,
    /// The PIC stopped taking orders; payments are being collected.
    Closed,
    /// The order was abandoned.
    Canceled,
}

impl OrderStatus {
    /// Whether line items may be added, edited or removed.
    #[inline]
    pub const fn accepts_line_item_changes(&self) -> bool {
        matches!(self, OrderStatus::Open)
    }

    /// Whether payment status may still be recorded.
    #[inline]
    pub const fn accepts_payments(&self) -> bool {
        matches!(self, OrderStatus::Open | OrderStatus::Closed)
    }

    /// Whether `self -> next` is an allowed transition.
    pub const fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Open, OrderStatus::Closed) | (OrderStatus::Open, OrderStatus::Canceled)
        )
    }

    /// Stable upper-case name, as stored and shown.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Closed => "CLOSED",
            OrderStatus::Canceled => "CANCELED",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Whether a participant has paid the PIC for a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    /// The opposite status.
    pub const fn toggled(&self) -> Self {
        match self {
            PaymentStatus::Paid => PaymentStatus::Unpaid,
            PaymentStatus::Unpaid => PaymentStatus::Paid,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Unpaid => "UNPAID",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Unpaid
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Menu
// =============================================================================

/// One entry of an order's menu. Names are unique within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    pub name: String,
    pub price: Money,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        MenuItem {
            name: name.into(),
            price,
        }
    }
}

// =============================================================================
// Pricing Rules
// =============================================================================

/// Discount and fee rules attached to an order.
///
/// ## Cap semantics
/// `max_discount` keeps "not entered" (`None`) apart from an explicit zero
/// (`Some(Money::zero())`) so the stored order reads back as entered. Both
/// mean "no cap" for the discount; see [`PricingRules::enforced_cap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingRules {
    /// Flat fee shared by all participants.
    pub service_and_delivery_fee: Money,

    /// Percentage discount on the gross total.
    pub discount_rate: DiscountRate,

    /// Absolute cap on the discount amount. `None` and `Some(0)` are both
    /// unbounded; the stored value keeps which one the PIC entered.
    pub max_discount: Option<Money>,

    /// Gross total required before any discount applies.
    pub min_order_for_discount: Money,
}

impl PricingRules {
    /// The cap that limits the discount, if any.
    ///
    /// A zero cap counts as no cap: create forms default the field to 0,
    /// and a PIC who leaves it there still gets the full percentage.
    pub fn enforced_cap(&self) -> Option<Money> {
        self.max_discount.filter(|cap| cap.is_positive())
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One participant's chosen menu item and quantity within an order.
///
/// Uses the snapshot pattern: `item_name` and `item_price` are frozen at
/// submission time and never re-derived from the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub order_id: String,
    pub user_id: String,
    /// Participant display name, resolved from their profile.
    pub user_name: Option<String>,
    /// Menu item name at time of order (frozen).
    pub item_name: String,
    /// Unit price at time of order (frozen).
    pub item_price: Money,
    pub quantity: i64,
    pub payment_status: PaymentStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.item_price.multiply_quantity(self.quantity)
    }

    /// Whether this row is the merge target for `(user_id, item_name)`.
    #[inline]
    pub fn matches(&self, user_id: &str, item_name: &str) -> bool {
        self.user_id == user_id && self.item_name == item_name
    }
}

/// A line item that has not been persisted yet.
///
/// Built by the join flow from the acting user and a menu entry, then
/// previewed against the order before it is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProposedLineItem {
    pub user_id: String,
    pub user_name: Option<String>,
    pub item_name: String,
    pub item_price: Money,
    pub quantity: i64,
}

impl ProposedLineItem {
    /// Proposal for `quantity` of a menu entry, priced from the menu.
    pub fn from_menu_item(principal: &Principal, item: &MenuItem, quantity: i64) -> Self {
        ProposedLineItem {
            user_id: principal.user_id.clone(),
            user_name: principal.display_name.clone(),
            item_name: item.name.clone(),
            item_price: item.price,
            quantity,
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// A group order, created by a PIC, with its menu and line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub title: String,
    pub store_name: String,
    /// User id of the person in charge.
    pub created_by: String,
    pub status: OrderStatus,
    pub pricing: PricingRules,
    pub menu: Vec<MenuItem>,
    pub line_items: Vec<LineItem>,
    #[ts(as = "String")]
    pub deadline: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Whether `user_id` is the PIC of this order.
    #[inline]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.created_by == user_id
    }

    /// Looks up a menu entry by exact name.
    pub fn menu_item(&self, name: &str) -> Option<&MenuItem> {
        self.menu.iter().find(|m| m.name == name)
    }

    /// Looks up a line item by id.
    pub fn line_item(&self, line_item_id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.id == line_item_id)
    }

    /// Number of distinct participants.
    pub fn participant_count(&self) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.line_items {
            if !seen.contains(&item.user_id.as_str()) {
                seen.push(&item.user_id);
            }
        }
        seen.len()
    }

    /// Whether the deadline has passed at `now`.
    #[inline]
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline <= now
    }
}

/// Everything a PIC supplies when creating an order.
///
/// Validated as a whole by [`crate::validation::validate_new_order`] before
/// anything is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub title: String,
    pub store_name: String,
    #[ts(as = "String")]
    pub deadline: DateTime<Utc>,
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub pricing: PricingRules,
}

// =============================================================================
// Principal
// =============================================================================

/// The acting user, supplied by the caller's authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl Principal {
    pub fn new(user_id: impl Into<String>) -> Self {
        Principal {
            user_id: user_id.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_from_percentage() {
        assert_eq!(DiscountRate::from_percentage(10.0).bps(), 1000);
        assert_eq!(DiscountRate::from_percentage(12.5).bps(), 1250);
        assert!((DiscountRate::from_bps(825).percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Closed));
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Canceled));
        assert!(!OrderStatus::Closed.can_transition_to(OrderStatus::Open));
        assert!(!OrderStatus::Canceled.can_transition_to(OrderStatus::Closed));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Open));

        assert!(OrderStatus::Open.accepts_line_item_changes());
        assert!(!OrderStatus::Closed.accepts_line_item_changes());
        assert!(OrderStatus::Closed.accepts_payments());
        assert!(!OrderStatus::Canceled.accepts_payments());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&OrderStatus::Canceled).unwrap(), "\"CANCELED\"");
        assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid).unwrap(), "\"UNPAID\"");
        assert_eq!(PaymentStatus::default(), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::Unpaid.toggled(), PaymentStatus::Paid);
    }

    #[test]
    fn test_enforced_cap_ignores_zero() {
        let mut rules = PricingRules::default();
        assert_eq!(rules.enforced_cap(), None);

        rules.max_discount = Some(Money::zero());
        assert_eq!(rules.enforced_cap(), None);

        rules.max_discount = Some(Money::from_minor(1000));
        assert_eq!(rules.enforced_cap(), Some(Money::from_minor(1000)));
    }
}
