//! # Participation
//!
//! Joining an order, editing line items, and recording payments.
//!
//! ## Join Flow (preview, then commit)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          join_order()                                   │
//! │                                                                         │
//! │  load order ──► OPEN? ──► before deadline? ──► quantity valid?         │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                              item on the menu? (price comes from menu)  │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                 preview(order, proposal)  ← pure, nothing written       │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                 check_discount_cap()  ── over cap ──► DISCOUNT_CAP_...  │
//! │                                                      │                  │
//! │                                                      ▼                  │
//! │                 add_or_merge()  ← single upsert, merges (user, item)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `preview_join` runs the same pipeline and stops before the write.
//!
//! ## Who may do what
//! | Operation                   | Participant (own item) | PIC  |
//! |-----------------------------|------------------------|------|
//! | join / preview              | yes                    | yes  |
//! | change quantity / remove    | yes                    | yes  |
//! | set / toggle payment status | no                     | yes  |

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use grouporder_core::validation::validate_quantity;
use grouporder_core::{
    check_discount_cap, preview, preview_quantity_change, CoreError, LineItem, Order,
    OrderSummary, PaymentStatus, Principal, ProposedLineItem,
};
use grouporder_db::Database;

use crate::error::{ServiceError, ServiceResult};
use crate::orders::{ensure_pic, load_order, remember_display_name};

/// What a participant asks for when joining an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JoinRequest {
    /// Name of an entry on the order's menu.
    pub item_name: String,
    pub quantity: i64,
}

impl JoinRequest {
    pub fn new(item_name: impl Into<String>, quantity: i64) -> Self {
        JoinRequest {
            item_name: item_name.into(),
            quantity,
        }
    }
}

// =============================================================================
// Join
// =============================================================================

/// Summary the order would have if `actor` joined with `request`.
///
/// Fails exactly where [`join_order`] would, including the discount cap
/// check, so a UI can show the rejection before the user confirms.
pub async fn preview_join(
    db: &Database,
    actor: &Principal,
    order_id: &str,
    request: &JoinRequest,
) -> ServiceResult<OrderSummary> {
    let order = load_order(db, order_id).await?;
    let (_, summary) = prepare_join(&order, actor, request)?;
    Ok(summary)
}

/// Adds the requested item to `actor`'s line items.
///
/// A second request for the same menu item merges into the existing row.
///
/// ## Returns
/// The stored line item after the merge.
pub async fn join_order(
    db: &Database,
    actor: &Principal,
    order_id: &str,
    request: &JoinRequest,
) -> ServiceResult<LineItem> {
    let order = load_order(db, order_id).await?;
    let (proposal, summary) = prepare_join(&order, actor, request)?;

    remember_display_name(db, actor).await?;

    let line_item = db.line_items().add_or_merge(&order.id, &proposal).await?;

    info!(
        order_id = %order.id,
        user_id = %actor.user_id,
        item_name = %line_item.item_name,
        quantity = line_item.quantity,
        grand_total = %summary.grand_total,
        "Participant joined order"
    );

    Ok(line_item)
}

/// Everything short of the write: state checks, menu lookup, preview and
/// cap check.
fn prepare_join(
    order: &Order,
    actor: &Principal,
    request: &JoinRequest,
) -> ServiceResult<(ProposedLineItem, OrderSummary)> {
    ensure_open(order)?;

    if order.is_past_deadline(Utc::now()) {
        warn!(order_id = %order.id, "Join after deadline");
        return Err(CoreError::DeadlinePassed {
            order_id: order.id.clone(),
        }
        .into());
    }

    validate_quantity(request.quantity)?;

    let item_name = request.item_name.trim();
    let menu_item = order
        .menu_item(item_name)
        .ok_or_else(|| CoreError::MenuItemNotFound {
            order_id: order.id.clone(),
            item_name: item_name.to_string(),
        })?;

    // The upsert adds to an existing row, so the merged quantity is what
    // has to stay within the limit.
    let held = order
        .line_items
        .iter()
        .find(|item| item.matches(&actor.user_id, &menu_item.name))
        .map_or(0, |item| item.quantity);
    validate_quantity(held + request.quantity)?;

    let proposal = ProposedLineItem::from_menu_item(actor, menu_item, request.quantity);
    let summary = preview(order, &proposal);

    debug!(
        order_id = %order.id,
        uncapped_discount = %summary.uncapped_discount_amount,
        discount = %summary.discount_amount,
        "Previewed join"
    );

    check_cap(order, &summary)?;
    Ok((proposal, summary))
}

// =============================================================================
// Line Item Edits
// =============================================================================

/// Sets the quantity of a line item.
///
/// A quantity of zero or less removes the line item and returns `None`.
/// Increases are checked against the discount cap like a join.
pub async fn update_line_item_quantity(
    db: &Database,
    actor: &Principal,
    line_item_id: &str,
    quantity: i64,
) -> ServiceResult<Option<LineItem>> {
    let (order, line_item) = load_line_item(db, line_item_id).await?;
    ensure_may_edit(&order, &line_item, actor)?;
    ensure_open(&order)?;

    if quantity > 0 {
        validate_quantity(quantity)?;

        if quantity > line_item.quantity {
            let summary = preview_quantity_change(&order, line_item_id, quantity)?;
            check_cap(&order, &summary)?;
        }
    }

    let updated = db.line_items().update_quantity(line_item_id, quantity).await?;

    match &updated {
        Some(item) => info!(line_item_id = %line_item_id, quantity = item.quantity, "Quantity changed"),
        None => info!(line_item_id = %line_item_id, "Line item removed by zero quantity"),
    }

    Ok(updated)
}

/// Deletes a line item.
pub async fn remove_line_item(
    db: &Database,
    actor: &Principal,
    line_item_id: &str,
) -> ServiceResult<()> {
    let (order, line_item) = load_line_item(db, line_item_id).await?;
    ensure_may_edit(&order, &line_item, actor)?;
    ensure_open(&order)?;

    db.line_items().delete(line_item_id).await?;
    info!(line_item_id = %line_item_id, order_id = %order.id, "Line item removed");

    Ok(())
}

// =============================================================================
// Payments
// =============================================================================

/// Records whether a participant has paid. PIC only; allowed while the
/// order is OPEN or CLOSED.
pub async fn set_payment_status(
    db: &Database,
    actor: &Principal,
    line_item_id: &str,
    status: PaymentStatus,
) -> ServiceResult<LineItem> {
    let (order, _) = load_line_item(db, line_item_id).await?;
    ensure_pic(&order, actor)?;
    ensure_accepts_payments(&order)?;

    let updated = db.line_items().set_payment_status(line_item_id, status).await?;
    info!(line_item_id = %line_item_id, status = %status, "Payment status recorded");

    Ok(updated)
}

/// Flips PAID to UNPAID and back.
pub async fn toggle_payment_status(
    db: &Database,
    actor: &Principal,
    line_item_id: &str,
) -> ServiceResult<LineItem> {
    let (order, line_item) = load_line_item(db, line_item_id).await?;
    ensure_pic(&order, actor)?;
    ensure_accepts_payments(&order)?;

    let status = line_item.payment_status.toggled();
    let updated = db.line_items().set_payment_status(line_item_id, status).await?;
    info!(line_item_id = %line_item_id, status = %status, "Payment status toggled");

    Ok(updated)
}

// =============================================================================
// Guards
// =============================================================================

async fn load_line_item(db: &Database, line_item_id: &str) -> ServiceResult<(Order, LineItem)> {
    let line_item = db
        .line_items()
        .get_by_id(line_item_id)
        .await?
        .ok_or_else(|| ServiceError::from(CoreError::LineItemNotFound(line_item_id.to_string())))?;

    let order = load_order(db, &line_item.order_id).await?;
    Ok((order, line_item))
}

fn ensure_open(order: &Order) -> ServiceResult<()> {
    if order.status.accepts_line_item_changes() {
        return Ok(());
    }

    warn!(order_id = %order.id, status = %order.status, "Order not open");
    Err(CoreError::OrderNotOpen {
        order_id: order.id.clone(),
        status: order.status,
    }
    .into())
}

fn ensure_accepts_payments(order: &Order) -> ServiceResult<()> {
    if order.status.accepts_payments() {
        return Ok(());
    }

    Err(CoreError::OrderNotOpen {
        order_id: order.id.clone(),
        status: order.status,
    }
    .into())
}

/// The line item's owner and the order's PIC may edit it.
fn ensure_may_edit(order: &Order, line_item: &LineItem, actor: &Principal) -> ServiceResult<()> {
    if line_item.user_id == actor.user_id || order.is_owned_by(&actor.user_id) {
        return Ok(());
    }

    warn!(line_item_id = %line_item.id, user_id = %actor.user_id, "Not allowed to edit line item");
    Err(CoreError::NotLineItemOwner {
        line_item_id: line_item.id.clone(),
        user_id: actor.user_id.clone(),
    }
    .into())
}

fn check_cap(order: &Order, summary: &OrderSummary) -> ServiceResult<()> {
    check_discount_cap(order, summary).map_err(|err| {
        warn!(order_id = %order.id, error = %err, "Discount cap exceeded");
        ServiceError::from(err)
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::orders::{cancel_order, close_order, create_order, get_order};
    use chrono::Duration;
    use grouporder_core::{DiscountRate, MenuItem, Money, NewOrder, PricingRules, MAX_ITEM_QUANTITY};
    use grouporder_db::DbConfig;

    async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Menu: Nasi Goreng 100.00, Es Teh 50.00. Fee 50.00, 10% off.
    async fn open_order(db: &Database, cap: Option<i64>) -> Order {
        let draft = NewOrder {
            title: "Lunch".to_string(),
            store_name: "Warung Bu Sri".to_string(),
            deadline: Utc::now() + Duration::hours(2),
            menu: vec![
                MenuItem::new("Nasi Goreng", Money::from_minor(10000)),
                MenuItem::new("Es Teh", Money::from_minor(5000)),
            ],
            pricing: PricingRules {
                service_and_delivery_fee: Money::from_minor(5000),
                discount_rate: DiscountRate::from_percentage(10.0),
                max_discount: cap.map(Money::from_minor),
                min_order_for_discount: Money::zero(),
            },
        };
        create_order(db, &Principal::new("pic"), draft)
            .await
            .unwrap()
            .order
    }

    #[tokio::test]
    async fn test_worked_example_end_to_end() {
        let db = database().await;
        let order = open_order(&db, Some(100000)).await;

        let alice = Principal::new("alice").with_display_name("Alice");
        let bob = Principal::new("bob").with_display_name("Bob");

        join_order(&db, &alice, &order.id, &JoinRequest::new("Nasi Goreng", 2))
            .await
            .unwrap();
        join_order(&db, &bob, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap();

        let summary = get_order(&db, &order.id).await.unwrap().summary;
        assert_eq!(summary.gross_total, Money::from_minor(25000));
        assert_eq!(summary.discount_amount, Money::from_minor(2500));
        assert_eq!(summary.net_total, Money::from_minor(22500));
        assert_eq!(summary.grand_total, Money::from_minor(27500));
        assert_eq!(summary.total_for_user("alice"), Some(Money::from_minor(22000)));
        assert_eq!(summary.total_for_user("bob"), Some(Money::from_minor(5500)));
        assert_eq!(summary.summary_by_user[0].user_name, "Alice");
    }

    #[tokio::test]
    async fn test_repeat_join_merges() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let alice = Principal::new("alice");

        let first = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap();
        let merged = join_order(&db, &alice, &order.id, &JoinRequest::new(" Es Teh ", 2))
            .await
            .unwrap();

        assert_eq!(merged.id, first.id);
        assert_eq!(merged.quantity, 3);

        let summary = get_order(&db, &order.id).await.unwrap().summary;
        assert_eq!(summary.summary_by_menu_item.len(), 1);
        assert_eq!(summary.summary_by_menu_item[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_repeat_join_cannot_pass_quantity_limit() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let alice = Principal::new("alice");

        join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", MAX_ITEM_QUANTITY))
            .await
            .unwrap();

        let err = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = preview_join(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Stored row untouched, and other users still have their own limit
        let detail = get_order(&db, &order.id).await.unwrap();
        assert_eq!(detail.order.line_items.len(), 1);
        assert_eq!(detail.order.line_items[0].quantity, MAX_ITEM_QUANTITY);

        let bob = Principal::new("bob");
        let bob_item = join_order(&db, &bob, &order.id, &JoinRequest::new("Es Teh", MAX_ITEM_QUANTITY))
            .await
            .unwrap();
        assert_eq!(bob_item.quantity, MAX_ITEM_QUANTITY);
    }

    #[tokio::test]
    async fn test_join_over_cap_is_rejected_before_write() {
        let db = database().await;
        // Cap 10.00: one Nasi Goreng (discount 10.00) fits, a second doesn't
        let order = open_order(&db, Some(1000)).await;
        let alice = Principal::new("alice");

        join_order(&db, &alice, &order.id, &JoinRequest::new("Nasi Goreng", 1))
            .await
            .unwrap();

        let request = JoinRequest::new("Es Teh", 1);
        let err = preview_join(&db, &alice, &order.id, &request)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DiscountCapExceeded);
        assert!(err.message.contains("by 5.00"));

        let err = join_order(&db, &alice, &order.id, &request).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DiscountCapExceeded);

        let detail = get_order(&db, &order.id).await.unwrap();
        assert_eq!(detail.order.line_items.len(), 1);
        assert_eq!(detail.summary.discount_amount, Money::from_minor(1000));
    }

    #[tokio::test]
    async fn test_zero_cap_is_no_cap() {
        let db = database().await;
        let order = open_order(&db, Some(0)).await;

        join_order(&db, &Principal::new("alice"), &order.id, &JoinRequest::new("Nasi Goreng", 3))
            .await
            .unwrap();

        let summary = get_order(&db, &order.id).await.unwrap().summary;
        assert_eq!(summary.discount_amount, Money::from_minor(3000));
        assert_eq!(summary.uncapped_discount_amount, Money::from_minor(3000));
    }

    #[tokio::test]
    async fn test_preview_join_writes_nothing() {
        let db = database().await;
        let order = open_order(&db, None).await;

        let summary = preview_join(
            &db,
            &Principal::new("alice"),
            &order.id,
            &JoinRequest::new("Nasi Goreng", 2),
        )
        .await
        .unwrap();
        assert_eq!(summary.gross_total, Money::from_minor(20000));

        let detail = get_order(&db, &order.id).await.unwrap();
        assert!(detail.order.line_items.is_empty());
    }

    #[tokio::test]
    async fn test_join_rejections() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let alice = Principal::new("alice");

        let err = join_order(&db, &alice, &order.id, &JoinRequest::new("Rendang", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = join_order(&db, &alice, "missing", &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        close_order(&db, &Principal::new("pic"), &order.id).await.unwrap();
        let err = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderClosed);
    }

    #[tokio::test]
    async fn test_quantity_edits() {
        let db = database().await;
        let order = open_order(&db, Some(2500)).await;
        let alice = Principal::new("alice");
        let bob = Principal::new("bob");

        let item = join_order(&db, &alice, &order.id, &JoinRequest::new("Nasi Goreng", 1))
            .await
            .unwrap();

        // Someone else's line item
        let err = update_line_item_quantity(&db, &bob, &item.id, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let updated = update_line_item_quantity(&db, &alice, &item.id, 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 2);

        // 3 × 100.00 → uncapped discount 30.00 > cap 25.00
        let err = update_line_item_quantity(&db, &alice, &item.id, 3)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::DiscountCapExceeded);

        // PIC may edit anyone's line item; zero removes it
        let removed = update_line_item_quantity(&db, &Principal::new("pic"), &item.id, 0)
            .await
            .unwrap();
        assert!(removed.is_none());
        assert!(get_order(&db, &order.id).await.unwrap().order.line_items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_line_item() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let alice = Principal::new("alice");

        let item = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap();

        let err = remove_line_item(&db, &Principal::new("bob"), &item.id)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        remove_line_item(&db, &alice, &item.id).await.unwrap();

        let err = remove_line_item(&db, &alice, &item.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_no_edits_once_closed() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let alice = Principal::new("alice");

        let item = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap();
        close_order(&db, &Principal::new("pic"), &order.id).await.unwrap();

        let err = update_line_item_quantity(&db, &alice, &item.id, 2)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderClosed);

        let err = remove_line_item(&db, &alice, &item.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderClosed);
    }

    #[tokio::test]
    async fn test_payment_status_is_pic_only() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let pic = Principal::new("pic");
        let alice = Principal::new("alice");

        let item = join_order(&db, &alice, &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap();
        assert_eq!(item.payment_status, PaymentStatus::Unpaid);

        let err = set_payment_status(&db, &alice, &item.id, PaymentStatus::Paid)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        // Payments are collected after closing
        close_order(&db, &pic, &order.id).await.unwrap();

        let paid = toggle_payment_status(&db, &pic, &item.id).await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        let unpaid = set_payment_status(&db, &pic, &item.id, PaymentStatus::Unpaid)
            .await
            .unwrap();
        assert_eq!(unpaid.payment_status, PaymentStatus::Unpaid);
    }

    #[tokio::test]
    async fn test_no_payments_on_canceled_order() {
        let db = database().await;
        let order = open_order(&db, None).await;
        let pic = Principal::new("pic");

        let item = join_order(&db, &Principal::new("alice"), &order.id, &JoinRequest::new("Es Teh", 1))
            .await
            .unwrap();
        cancel_order(&db, &pic, &order.id).await.unwrap();

        let err = toggle_payment_status(&db, &pic, &item.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderClosed);
    }
}
