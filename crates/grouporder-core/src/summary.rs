//! # Order Summary (Allocation Engine)
//!
//! Turns an order and its line items into gross/net totals, a per-line
//! final price and two rollups.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line items ──► gross_total = Σ price × qty                             │
//! │                     │                                                   │
//! │                     ├── gross == 0? ──► zero summary (no division)      │
//! │                     ▼                                                   │
//! │  gross >= min_order_for_discount?                                       │
//! │       yes ──► uncapped = gross × rate      no ──► 0                     │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  discount = min(uncapped, max_discount)   (None = no cap)               │
//! │  net = gross − discount,  grand = net + fee                             │
//! │                     │                                                   │
//! │                     ▼                                                   │
//! │  discount and fee each apportioned by line total (largest remainder)    │
//! │  final_price = line_total − discount_share + fee_share                  │
//! │                     │                                                   │
//! │          ┌──────────┴──────────┐                                        │
//! │          ▼                     ▼                                        │
//! │   by menu item (qty)    by user (final price)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exactness
//! All amounts are integer minor units, so `net = gross − discount`,
//! `grand = net + fee` and `Σ final_price == grand` hold exactly.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{LineItem, Order, PricingRules};
use crate::UNKNOWN_USER_NAME;

// =============================================================================
// Summary Types
// =============================================================================

/// A line item together with its share of the discount and fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AllocatedLineItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub line_item: LineItem,
    /// `item_price × quantity`.
    pub line_total: Money,
    /// Portion of the order discount credited to this line.
    pub discount_share: Money,
    /// Portion of the service/delivery fee charged to this line.
    pub fee_share: Money,
    /// What the participant owes for this line.
    pub final_price: Money,
}

/// Quantity total for one menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItemTotal {
    pub name: String,
    pub quantity: i64,
}

/// What one participant owes across all their line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserTotal {
    pub user_id: String,
    pub user_name: String,
    pub final_price: Money,
}

/// Derived cost summary of an order. Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSummary {
    pub gross_total: Money,
    /// Discount actually granted (after the cap).
    pub discount_amount: Money,
    /// Discount before the cap; what join requests are checked against.
    pub uncapped_discount_amount: Money,
    pub net_total: Money,
    pub additional_fees: Money,
    pub grand_total: Money,
    pub line_items: Vec<AllocatedLineItem>,
    pub summary_by_menu_item: Vec<MenuItemTotal>,
    pub summary_by_user: Vec<UserTotal>,
}

impl OrderSummary {
    /// Summary of an order with nothing (or nothing billable) in it.
    ///
    /// Every monetary field is zero except `additional_fees`, which still
    /// reports the configured fee.
    pub fn zero(pricing: &PricingRules) -> Self {
        OrderSummary {
            gross_total: Money::zero(),
            discount_amount: Money::zero(),
            uncapped_discount_amount: Money::zero(),
            net_total: Money::zero(),
            additional_fees: pricing.service_and_delivery_fee,
            grand_total: Money::zero(),
            line_items: Vec::new(),
            summary_by_menu_item: Vec::new(),
            summary_by_user: Vec::new(),
        }
    }

    /// Final price owed by `user_id`, if they have any line items.
    pub fn total_for_user(&self, user_id: &str) -> Option<Money> {
        self.summary_by_user
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| u.final_price)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Computes the cost summary of `order`.
///
/// Pure and deterministic: same order in, same summary out. Never fails;
/// an order whose gross total is zero yields [`OrderSummary::zero`].
///
/// ## Example
/// ```rust
/// # use chrono::Utc;
/// # use grouporder_core::*;
/// # let now = Utc::now();
/// # let line = |id: &str, user: &str, price: i64, qty: i64| LineItem {
/// #     id: id.into(), order_id: "o".into(), user_id: user.into(), user_name: None,
/// #     item_name: format!("item-{price}"), item_price: Money::from_minor(price),
/// #     quantity: qty, payment_status: PaymentStatus::Unpaid, created_at: now, updated_at: now,
/// # };
/// let order = Order {
///     id: "o".into(),
///     title: "Lunch".into(),
///     store_name: "Warung".into(),
///     created_by: "pic".into(),
///     status: OrderStatus::Open,
///     pricing: PricingRules {
///         service_and_delivery_fee: Money::from_minor(5000),
///         discount_rate: DiscountRate::from_percentage(10.0),
///         max_discount: Some(Money::from_minor(100_000)),
///         min_order_for_discount: Money::zero(),
///     },
///     menu: vec![],
///     line_items: vec![line("a", "alice", 10000, 2), line("b", "bob", 5000, 1)],
///     deadline: now,
///     created_at: now,
///     updated_at: now,
/// };
///
/// let summary = compute_summary(&order);
/// assert_eq!(summary.grand_total, Money::from_minor(27500));
/// assert_eq!(summary.total_for_user("alice"), Some(Money::from_minor(22000)));
/// assert_eq!(summary.total_for_user("bob"), Some(Money::from_minor(5500)));
/// ```
pub fn compute_summary(order: &Order) -> OrderSummary {
    summarize(&order.pricing, &order.line_items)
}

/// Computes a summary from pricing rules and a line-item collection.
///
/// [`compute_summary`] delegates here; the preview path uses it directly on
/// a hypothetical collection without cloning the whole order.
pub fn summarize(pricing: &PricingRules, line_items: &[LineItem]) -> OrderSummary {
    let line_totals: Vec<Money> = line_items.iter().map(LineItem::line_total).collect();
    let gross_total: Money = line_totals.iter().copied().sum();

    if gross_total.is_zero() {
        return OrderSummary::zero(pricing);
    }

    let uncapped_discount_amount = if gross_total >= pricing.min_order_for_discount {
        gross_total.percent_of(pricing.discount_rate)
    } else {
        Money::zero()
    };

    let discount_amount = match pricing.enforced_cap() {
        Some(cap) => uncapped_discount_amount.min(cap),
        None => uncapped_discount_amount,
    };

    let net_total = gross_total - discount_amount;
    let additional_fees = pricing.service_and_delivery_fee;
    let grand_total = net_total + additional_fees;

    let weights: Vec<i64> = line_totals.iter().map(Money::minor_units).collect();
    let discount_shares = discount_amount.allocate(&weights);
    let fee_shares = additional_fees.allocate(&weights);

    let allocated: Vec<AllocatedLineItem> = line_items
        .iter()
        .zip(line_totals)
        .zip(discount_shares.into_iter().zip(fee_shares))
        .map(|((item, line_total), (discount_share, fee_share))| AllocatedLineItem {
            line_item: item.clone(),
            line_total,
            discount_share,
            fee_share,
            final_price: line_total - discount_share + fee_share,
        })
        .collect();

    OrderSummary {
        gross_total,
        discount_amount,
        uncapped_discount_amount,
        net_total,
        additional_fees,
        grand_total,
        summary_by_menu_item: rollup_by_menu_item(line_items),
        summary_by_user: rollup_by_user(&allocated),
        line_items: allocated,
    }
}

// =============================================================================
// Rollups
// =============================================================================

/// Sums quantity per item name, in first-seen order.
fn rollup_by_menu_item(line_items: &[LineItem]) -> Vec<MenuItemTotal> {
    let mut totals: Vec<MenuItemTotal> = Vec::new();
    for item in line_items {
        match totals.iter_mut().find(|t| t.name == item.item_name) {
            Some(total) => total.quantity += item.quantity,
            None => totals.push(MenuItemTotal {
                name: item.item_name.clone(),
                quantity: item.quantity,
            }),
        }
    }
    totals
}

/// Sums final price per user, in first-seen order.
///
/// The display name comes from the user's first line item; later rows never
/// overwrite it.
fn rollup_by_user(allocated: &[AllocatedLineItem]) -> Vec<UserTotal> {
    let mut totals: Vec<UserTotal> = Vec::new();
    for entry in allocated {
        let item = &entry.line_item;
        match totals.iter_mut().find(|t| t.user_id == item.user_id) {
            Some(total) => total.final_price += entry.final_price,
            None => totals.push(UserTotal {
                user_id: item.user_id.clone(),
                user_name: item
                    .user_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string()),
                final_price: entry.final_price,
            }),
        }
    }
    totals
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountRate, OrderStatus, PaymentStatus};
    use chrono::Utc;

    fn line(id: &str, user: &str, item: &str, price: i64, qty: i64) -> LineItem {
        let now = Utc::now();
        LineItem {
            id: id.to_string(),
            order_id: "order-1".to_string(),
            user_id: user.to_string(),
            user_name: Some(format!("{} name", user)),
            item_name: item.to_string(),
            item_price: Money::from_minor(price),
            quantity: qty,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    fn order(pricing: PricingRules, line_items: Vec<LineItem>) -> Order {
        let now = Utc::now();
        Order {
            id: "order-1".to_string(),
            title: "Friday lunch".to_string(),
            store_name: "Warung Bu Sri".to_string(),
            created_by: "pic".to_string(),
            status: OrderStatus::Open,
            pricing,
            menu: Vec::new(),
            line_items,
            deadline: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn worked_example_pricing(cap: i64) -> PricingRules {
        PricingRules {
            service_and_delivery_fee: Money::from_minor(50),
            discount_rate: DiscountRate::from_percentage(10.0),
            max_discount: Some(Money::from_minor(cap)),
            min_order_for_discount: Money::zero(),
        }
    }

    fn assert_invariants(summary: &OrderSummary) {
        assert_eq!(summary.net_total, summary.gross_total - summary.discount_amount);
        assert_eq!(summary.grand_total, summary.net_total + summary.additional_fees);
        assert!(summary.discount_amount <= summary.uncapped_discount_amount);

        let line_sum: Money = summary.line_items.iter().map(|l| l.final_price).sum();
        assert_eq!(line_sum, summary.grand_total);

        let user_sum: Money = summary.summary_by_user.iter().map(|u| u.final_price).sum();
        assert_eq!(user_sum, summary.grand_total);
    }

    #[test]
    fn test_empty_order_is_zero_summary() {
        let summary = compute_summary(&order(worked_example_pricing(1000), vec![]));

        assert!(summary.gross_total.is_zero());
        assert!(summary.net_total.is_zero());
        assert!(summary.discount_amount.is_zero());
        assert!(summary.uncapped_discount_amount.is_zero());
        assert!(summary.grand_total.is_zero());
        assert_eq!(summary.additional_fees, Money::from_minor(50));
        assert!(summary.line_items.is_empty());
        assert!(summary.summary_by_menu_item.is_empty());
        assert!(summary.summary_by_user.is_empty());
    }

    #[test]
    fn test_free_items_do_not_divide_by_zero() {
        let summary = compute_summary(&order(
            worked_example_pricing(1000),
            vec![line("1", "alice", "Air Putih", 0, 3)],
        ));
        assert_eq!(summary, OrderSummary::zero(&worked_example_pricing(1000)));
    }

    /// Worked example: fee 50, 10%, cap 1000; A 100×2, B 50×1.
    #[test]
    fn test_worked_example() {
        let summary = compute_summary(&order(
            worked_example_pricing(1000),
            vec![
                line("1", "alice", "Nasi Goreng", 100, 2),
                line("2", "bob", "Es Teh", 50, 1),
            ],
        ));

        assert_eq!(summary.gross_total, Money::from_minor(250));
        assert_eq!(summary.uncapped_discount_amount, Money::from_minor(25));
        assert_eq!(summary.discount_amount, Money::from_minor(25));
        assert_eq!(summary.net_total, Money::from_minor(225));
        assert_eq!(summary.grand_total, Money::from_minor(275));

        assert_eq!(summary.line_items[0].final_price, Money::from_minor(220));
        assert_eq!(summary.line_items[0].discount_share, Money::from_minor(20));
        assert_eq!(summary.line_items[0].fee_share, Money::from_minor(40));
        assert_eq!(summary.line_items[1].final_price, Money::from_minor(55));

        assert_invariants(&summary);
    }

    #[test]
    fn test_cap_limits_discount() {
        let summary = compute_summary(&order(
            worked_example_pricing(10),
            vec![
                line("1", "alice", "Nasi Goreng", 100, 2),
                line("2", "bob", "Es Teh", 50, 1),
            ],
        ));

        assert_eq!(summary.uncapped_discount_amount, Money::from_minor(25));
        assert_eq!(summary.discount_amount, Money::from_minor(10));
        assert_eq!(summary.net_total, Money::from_minor(240));
        assert_eq!(summary.grand_total, Money::from_minor(290));
        assert_invariants(&summary);
    }

    #[test]
    fn test_unset_and_zero_caps_are_unbounded() {
        // 100.00 + 2 x 50.00 would make a zero cap swallow the whole 10%
        let items = vec![
            line("1", "alice", "Nasi Goreng", 10_000, 2),
            line("2", "bob", "Es Teh", 5_000, 1),
        ];

        let mut pricing = worked_example_pricing(0);
        pricing.max_discount = None;
        let unset = compute_summary(&order(pricing, items.clone()));
        assert_eq!(unset.discount_amount, Money::from_minor(2_500));
        assert_eq!(unset.discount_amount, unset.uncapped_discount_amount);

        let zero_cap = compute_summary(&order(worked_example_pricing(0), items));
        assert_eq!(zero_cap.discount_amount, Money::from_minor(2_500));
        assert_eq!(zero_cap.discount_amount, zero_cap.uncapped_discount_amount);
        assert_eq!(zero_cap.grand_total, Money::from_minor(22_550));
        assert_invariants(&zero_cap);
    }

    #[test]
    fn test_unset_cap_with_threshold_grants_full_discount() {
        let pricing = PricingRules {
            service_and_delivery_fee: Money::from_minor(1_000),
            discount_rate: DiscountRate::from_percentage(20.0),
            max_discount: None,
            min_order_for_discount: Money::from_minor(50_000),
        };

        let below = compute_summary(&order(
            pricing,
            vec![line("1", "alice", "Nasi Goreng", 20_000, 2)],
        ));
        assert!(below.discount_amount.is_zero());
        assert_eq!(below.discount_amount, below.uncapped_discount_amount);

        let above = compute_summary(&order(
            pricing,
            vec![
                line("1", "alice", "Nasi Goreng", 20_000, 2),
                line("2", "bob", "Nasi Goreng", 20_000, 1),
            ],
        ));
        assert_eq!(above.gross_total, Money::from_minor(60_000));
        assert_eq!(above.discount_amount, Money::from_minor(12_000));
        assert_eq!(above.discount_amount, above.uncapped_discount_amount);
        assert_invariants(&above);
    }

    #[test]
    fn test_below_minimum_gets_no_discount() {
        let mut pricing = worked_example_pricing(1000);
        pricing.discount_rate = DiscountRate::from_percentage(50.0);
        pricing.min_order_for_discount = Money::from_minor(300);

        let summary = compute_summary(&order(
            pricing,
            vec![line("1", "alice", "Nasi Goreng", 100, 2)],
        ));
        assert!(summary.discount_amount.is_zero());
        assert!(summary.uncapped_discount_amount.is_zero());
        assert_eq!(summary.grand_total, Money::from_minor(250));

        // Reaching the threshold exactly qualifies
        let summary = compute_summary(&order(
            pricing,
            vec![line("1", "alice", "Nasi Goreng", 100, 3)],
        ));
        assert_eq!(summary.discount_amount, Money::from_minor(150));
    }

    #[test]
    fn test_uneven_split_still_sums_exactly() {
        let pricing = PricingRules {
            service_and_delivery_fee: Money::from_minor(1000),
            discount_rate: DiscountRate::from_percentage(15.0),
            max_discount: None,
            min_order_for_discount: Money::zero(),
        };
        let summary = compute_summary(&order(
            pricing,
            vec![
                line("1", "alice", "Soto", 333, 1),
                line("2", "bob", "Soto", 333, 1),
                line("3", "carol", "Soto", 333, 1),
                line("4", "carol", "Kerupuk", 7, 3),
            ],
        ));
        assert_invariants(&summary);
    }

    #[test]
    fn test_rollups_keep_first_seen_order() {
        let mut items = vec![
            line("1", "bob", "Es Teh", 50, 1),
            line("2", "alice", "Nasi Goreng", 100, 2),
            line("3", "bob", "Nasi Goreng", 100, 1),
            line("4", "carol", "Es Teh", 50, 2),
        ];
        items[2].user_name = Some("Robert".to_string());

        let summary = compute_summary(&order(worked_example_pricing(1000), items));

        let menu: Vec<(&str, i64)> = summary
            .summary_by_menu_item
            .iter()
            .map(|m| (m.name.as_str(), m.quantity))
            .collect();
        assert_eq!(menu, vec![("Es Teh", 3), ("Nasi Goreng", 3)]);

        let users: Vec<&str> = summary.summary_by_user.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(users, vec!["bob", "alice", "carol"]);
        assert_eq!(summary.summary_by_user[0].user_name, "bob name");
        assert_invariants(&summary);
    }

    #[test]
    fn test_missing_display_name_falls_back() {
        let mut item = line("1", "ghost", "Es Teh", 50, 1);
        item.user_name = None;
        let summary = compute_summary(&order(worked_example_pricing(1000), vec![item]));
        assert_eq!(summary.summary_by_user[0].user_name, UNKNOWN_USER_NAME);
    }

    #[test]
    fn test_summary_serializes_flattened_line_items() {
        let summary = compute_summary(&order(
            worked_example_pricing(1000),
            vec![line("1", "alice", "Nasi Goreng", 100, 2)],
        ));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["line_items"][0]["item_name"], "Nasi Goreng");
        assert_eq!(json["line_items"][0]["final_price"], 230);
        assert_eq!(json["grand_total"], 230);
    }
}
