//! # Preview / Cap Check
//!
//! First half of the two-phase join protocol. Nothing here touches storage.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Participant submits (item, qty)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  preview(order, proposal)      ◄── THIS MODULE (pure)                  │
//! │       │  hypothetical copy of the line items, merged by (user, item)    │
//! │       ▼                                                                 │
//! │  check_discount_cap(order, summary)                                     │
//! │       │                                                                 │
//! │       ├── over cap ──► DiscountCapExceeded (nothing persisted)          │
//! │       ▼                                                                 │
//! │  commit (grouporder-service) ──► upsert-merge in the database          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::summary::{summarize, OrderSummary};
use crate::types::{LineItem, Order, PaymentStatus, ProposedLineItem};

/// Summary the order would have if `proposal` were committed.
///
/// A proposal for a `(user, item_name)` pair that already has a row merges
/// into it by summing quantity, exactly as the commit does. Otherwise the
/// proposal is appended as a new, unpaid row.
pub fn preview(order: &Order, proposal: &ProposedLineItem) -> OrderSummary {
    let mut line_items = order.line_items.clone();

    match line_items
        .iter_mut()
        .find(|li| li.matches(&proposal.user_id, &proposal.item_name))
    {
        Some(existing) => existing.quantity += proposal.quantity,
        None => line_items.push(LineItem {
            // Not persisted; the id is assigned on commit
            id: String::new(),
            order_id: order.id.clone(),
            user_id: proposal.user_id.clone(),
            user_name: proposal.user_name.clone(),
            item_name: proposal.item_name.clone(),
            item_price: proposal.item_price,
            quantity: proposal.quantity,
            payment_status: PaymentStatus::Unpaid,
            created_at: order.updated_at,
            updated_at: order.updated_at,
        }),
    }

    summarize(&order.pricing, &line_items)
}

/// Summary the order would have if line item `line_item_id` had
/// `new_quantity`. A quantity of zero or less removes the row.
pub fn preview_quantity_change(
    order: &Order,
    line_item_id: &str,
    new_quantity: i64,
) -> CoreResult<OrderSummary> {
    if order.line_item(line_item_id).is_none() {
        return Err(CoreError::LineItemNotFound(line_item_id.to_string()));
    }

    let line_items: Vec<LineItem> = order
        .line_items
        .iter()
        .filter(|li| li.id != line_item_id || new_quantity > 0)
        .cloned()
        .map(|mut li| {
            if li.id == line_item_id {
                li.quantity = new_quantity;
            }
            li
        })
        .collect();

    Ok(summarize(&order.pricing, &line_items))
}

/// Rejects a previewed summary whose uncapped discount is over the order's
/// cap.
///
/// Only a set, non-zero `max_discount` is enforced. Unset and zero caps are
/// both unbounded and never block anyone from joining.
pub fn check_discount_cap(order: &Order, summary: &OrderSummary) -> CoreResult<()> {
    let Some(cap) = order.pricing.enforced_cap() else {
        return Ok(());
    };

    if summary.uncapped_discount_amount > cap {
        return Err(CoreError::DiscountCapExceeded {
            uncapped: summary.uncapped_discount_amount,
            cap,
            excess: summary.uncapped_discount_amount - cap,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::summary::compute_summary;
    use crate::types::{DiscountRate, OrderStatus, PricingRules};
    use chrono::Utc;

    fn line(id: &str, user: &str, item: &str, price: i64, qty: i64) -> LineItem {
        let now = Utc::now();
        LineItem {
            id: id.to_string(),
            order_id: "order-1".to_string(),
            user_id: user.to_string(),
            user_name: None,
            item_name: item.to_string(),
            item_price: Money::from_minor(price),
            quantity: qty,
            payment_status: PaymentStatus::Unpaid,
            created_at: now,
            updated_at: now,
        }
    }

    fn order_with_cap(cap: Option<i64>) -> Order {
        let now = Utc::now();
        Order {
            id: "order-1".to_string(),
            title: "Friday lunch".to_string(),
            store_name: "Warung Bu Sri".to_string(),
            created_by: "pic".to_string(),
            status: OrderStatus::Open,
            pricing: PricingRules {
                service_and_delivery_fee: Money::from_minor(50),
                discount_rate: DiscountRate::from_percentage(10.0),
                max_discount: cap.map(Money::from_minor),
                min_order_for_discount: Money::zero(),
            },
            menu: Vec::new(),
            line_items: vec![
                line("1", "alice", "Nasi Goreng", 100, 2),
                line("2", "bob", "Es Teh", 50, 1),
            ],
            deadline: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn proposal(user: &str, item: &str, price: i64, qty: i64) -> ProposedLineItem {
        ProposedLineItem {
            user_id: user.to_string(),
            user_name: None,
            item_name: item.to_string(),
            item_price: Money::from_minor(price),
            quantity: qty,
        }
    }

    #[test]
    fn test_preview_merges_duplicate_submission() {
        let order = order_with_cap(Some(1000));
        let summary = preview(&order, &proposal("alice", "Nasi Goreng", 100, 1));

        assert_eq!(summary.line_items.len(), 2);
        assert_eq!(summary.line_items[0].line_item.quantity, 3);
        assert_eq!(summary.summary_by_menu_item[0].quantity, 3);
        assert_eq!(summary.gross_total, Money::from_minor(350));

        // the order itself is untouched
        assert_eq!(order.line_items[0].quantity, 2);
    }

    #[test]
    fn test_preview_appends_new_row() {
        let order = order_with_cap(Some(1000));
        let summary = preview(&order, &proposal("carol", "Es Teh", 50, 2));

        assert_eq!(summary.line_items.len(), 3);
        assert_eq!(summary.gross_total, Money::from_minor(350));
        assert_eq!(summary.summary_by_menu_item[1].quantity, 3);
    }

    #[test]
    fn test_cap_rejects_preview_over_cap() {
        // uncapped is already 25 against a cap of 10
        let order = order_with_cap(Some(10));
        let summary = preview(&order, &proposal("carol", "Es Teh", 50, 1));
        assert_eq!(summary.uncapped_discount_amount, Money::from_minor(30));

        let err = check_discount_cap(&order, &summary).unwrap_err();
        match err {
            CoreError::DiscountCapExceeded { uncapped, cap, excess } => {
                assert_eq!(uncapped, Money::from_minor(30));
                assert_eq!(cap, Money::from_minor(10));
                assert_eq!(excess, Money::from_minor(20));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cap_allows_preview_within_cap() {
        let order = order_with_cap(Some(1000));
        let summary = preview(&order, &proposal("carol", "Es Teh", 50, 1));
        assert!(check_discount_cap(&order, &summary).is_ok());
    }

    #[test]
    fn test_unset_and_zero_caps_never_reject() {
        for cap in [None, Some(0)] {
            let order = order_with_cap(cap);
            let summary = preview(&order, &proposal("carol", "Nasi Goreng", 100, 50));
            assert!(check_discount_cap(&order, &summary).is_ok());
        }
    }

    #[test]
    fn test_preview_quantity_change() {
        let order = order_with_cap(Some(1000));

        let raised = preview_quantity_change(&order, "2", 3).unwrap();
        assert_eq!(raised.gross_total, Money::from_minor(350));

        let removed = preview_quantity_change(&order, "2", 0).unwrap();
        assert_eq!(removed.line_items.len(), 1);
        assert_eq!(removed.gross_total, Money::from_minor(200));

        let all_removed = preview_quantity_change(&order_with_cap(None), "1", -1).unwrap();
        assert_eq!(all_removed.gross_total, Money::from_minor(50));

        assert!(matches!(
            preview_quantity_change(&order, "missing", 1),
            Err(CoreError::LineItemNotFound(_))
        ));
    }

    #[test]
    fn test_preview_of_empty_order_matches_single_line_summary() {
        let mut order = order_with_cap(None);
        order.line_items.clear();

        let previewed = preview(&order, &proposal("alice", "Nasi Goreng", 100, 2));
        order.line_items.push(line("x", "alice", "Nasi Goreng", 100, 2));
        let actual = compute_summary(&order);

        assert_eq!(previewed.grand_total, actual.grand_total);
        assert_eq!(previewed.summary_by_user[0].final_price, actual.summary_by_user[0].final_price);
    }
}
