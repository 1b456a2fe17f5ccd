//! # grouporder-core: Pure Business Logic for Group Order
//!
//! A person-in-charge (PIC) opens an order with a menu and discount rules,
//! participants join and pick items, and this crate works out what every
//! participant owes. Everything here is a pure function with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Group Order Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (web)                               │   │
//! │  │    Order list ──► Order detail ──► Join form ──► Summary view   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 grouporder-service                              │   │
//! │  │    create_order, join_order, close_order, set_payment_status   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ grouporder-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  summary  │  │ validation│  │   │
//! │  │   │   Order   │  │   Money   │  │  engine   │  │   rules   │  │   │
//! │  │   │ LineItem  │  │ allocate  │  │  preview  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 grouporder-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, LineItem, PricingRules, ...)
//! - [`money`] - Money type with integer arithmetic and exact allocation
//! - [`summary`] - The allocation engine: `compute_summary`
//! - [`preview`] - Speculative recompute and discount-cap check
//! - [`validation`] - Boundary validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use grouporder_core::money::Money;
//! use grouporder_core::types::DiscountRate;
//!
//! let gross = Money::from_minor(25000);
//! let discount = gross.percent_of(DiscountRate::from_percentage(10.0));
//! assert_eq!(discount.minor_units(), 2500);
//!
//! // Split a 50.00 fee over subtotals of 200.00 and 50.00
//! let shares = Money::from_minor(5000).allocate(&[20000, 5000]);
//! assert_eq!(shares, vec![Money::from_minor(4000), Money::from_minor(1000)]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod preview;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use preview::{check_discount_cap, preview, preview_quantity_change};
pub use summary::{compute_summary, summarize, AllocatedLineItem, MenuItemTotal, OrderSummary, UserTotal};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Display name used in the per-user rollup when a participant has no
/// profile name.
pub const UNKNOWN_USER_NAME: &str = "Unknown";

/// Maximum quantity of a single menu item per participant.
///
/// Catches typos like 100 instead of 10 before they skew everyone's share.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest price, fee, cap or threshold an order may carry, in minor units
/// (10 billion major units).
///
/// Keeps `price * MAX_ITEM_QUANTITY` summed over any realistic number of
/// line items far inside `i64`.
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000;

/// Maximum number of entries on one order's menu.
pub const MAX_MENU_ITEMS: usize = 100;

/// Maximum length of titles, store names and menu item names.
pub const MAX_NAME_LENGTH: usize = 200;
