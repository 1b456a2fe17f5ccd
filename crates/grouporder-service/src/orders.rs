//! # Order Operations
//!
//! Creating, reading, listing and closing orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Order Lifecycle                                 │
//! │                                                                         │
//! │  1. CREATE (any user, who becomes the PIC)                             │
//! │     └── create_order() → Order { status: OPEN }                        │
//! │                                                                         │
//! │  2. COLLECT (participants, see participation.rs)                       │
//! │     └── list_active_orders() shows it until the deadline               │
//! │                                                                         │
//! │  3. CLOSE or CANCEL (PIC only)                                         │
//! │     └── close_order()  → CLOSED   (payments still recorded)            │
//! │     └── cancel_order() → CANCELED (nothing changes any more)           │
//! │                                                                         │
//! │  4. HISTORY                                                            │
//! │     └── list_order_history() for the PIC and every participant         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use grouporder_core::validation::validate_new_order;
use grouporder_core::{
    compute_summary, CoreError, Money, NewOrder, Order, OrderStatus, OrderSummary, Principal,
};
use grouporder_db::Database;

use crate::error::{ServiceError, ServiceResult};

// =============================================================================
// Response Types
// =============================================================================

/// An order together with its computed summary.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub summary: OrderSummary,
}

impl From<Order> for OrderDetail {
    fn from(order: Order) -> Self {
        let summary = compute_summary(&order);
        OrderDetail { order, summary }
    }
}

/// One row of an order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct OrderOverview {
    pub id: String,
    pub title: String,
    pub store_name: String,
    pub created_by: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub deadline: DateTime<Utc>,
    pub participant_count: usize,
    pub grand_total: Money,
}

impl From<&Order> for OrderOverview {
    fn from(order: &Order) -> Self {
        OrderOverview {
            id: order.id.clone(),
            title: order.title.clone(),
            store_name: order.store_name.clone(),
            created_by: order.created_by.clone(),
            status: order.status,
            deadline: order.deadline,
            participant_count: order.participant_count(),
            grand_total: compute_summary(order).grand_total,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Creates an OPEN order with `actor` as its PIC.
///
/// The whole draft is validated before anything is written: title and
/// store name, a deadline in the future, a non-empty menu with unique names
/// and non-negative prices, and sane pricing rules.
pub async fn create_order(
    db: &Database,
    actor: &Principal,
    draft: NewOrder,
) -> ServiceResult<OrderDetail> {
    let draft = validate_new_order(&draft, Utc::now())?;

    remember_display_name(db, actor).await?;

    let order = db.orders().create(&actor.user_id, &draft).await?;

    info!(
        order_id = %order.id,
        pic = %actor.user_id,
        deadline = %order.deadline,
        "Order opened"
    );

    Ok(OrderDetail::from(order))
}

/// Loads an order with its current summary.
pub async fn get_order(db: &Database, order_id: &str) -> ServiceResult<OrderDetail> {
    load_order(db, order_id).await.map(OrderDetail::from)
}

/// OPEN orders whose deadline is still ahead, newest first.
pub async fn list_active_orders(db: &Database) -> ServiceResult<Vec<OrderOverview>> {
    let now = Utc::now();

    let orders = db.orders().list_open().await?;

    Ok(orders
        .iter()
        .filter(|order| !order.is_past_deadline(now))
        .map(OrderOverview::from)
        .collect())
}

/// CLOSED and CANCELED orders `actor` created or joined, latest deadline
/// first.
pub async fn list_order_history(
    db: &Database,
    actor: &Principal,
) -> ServiceResult<Vec<OrderOverview>> {
    let orders = db.orders().list_history_for_user(&actor.user_id).await?;
    Ok(orders.iter().map(OrderOverview::from).collect())
}

/// Stops taking participants. Payments may still be recorded afterwards.
pub async fn close_order(
    db: &Database,
    actor: &Principal,
    order_id: &str,
) -> ServiceResult<OrderDetail> {
    transition(db, actor, order_id, OrderStatus::Closed).await
}

/// Abandons the order.
pub async fn cancel_order(
    db: &Database,
    actor: &Principal,
    order_id: &str,
) -> ServiceResult<OrderDetail> {
    transition(db, actor, order_id, OrderStatus::Canceled).await
}

async fn transition(
    db: &Database,
    actor: &Principal,
    order_id: &str,
    to: OrderStatus,
) -> ServiceResult<OrderDetail> {
    let order = load_order(db, order_id).await?;
    ensure_pic(&order, actor)?;

    if !order.status.can_transition_to(to) {
        warn!(order_id = %order_id, from = %order.status, to = %to, "Rejected status change");
        return Err(CoreError::InvalidStatusTransition {
            order_id: order.id,
            from: order.status,
            to,
        }
        .into());
    }

    db.orders().update_status(order_id, order.status, to).await?;
    info!(order_id = %order_id, from = %order.status, to = %to, "Order status changed");

    get_order(db, order_id).await
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Loads an order or fails with `NOT_FOUND`.
pub(crate) async fn load_order(db: &Database, order_id: &str) -> ServiceResult<Order> {
    db.orders()
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Order", order_id))
}

/// Fails unless `actor` is the order's PIC.
pub(crate) fn ensure_pic(order: &Order, actor: &Principal) -> ServiceResult<()> {
    if order.is_owned_by(&actor.user_id) {
        return Ok(());
    }

    warn!(order_id = %order.id, user_id = %actor.user_id, "Not the person in charge");
    Err(CoreError::NotOrderOwner {
        order_id: order.id.clone(),
        user_id: actor.user_id.clone(),
    }
    .into())
}

/// Stores the actor's display name, if they supplied one, so it shows up
/// next to their line items.
pub(crate) async fn remember_display_name(db: &Database, actor: &Principal) -> ServiceResult<()> {
    if let Some(name) = actor.display_name.as_deref().map(str::trim) {
        if !name.is_empty() {
            db.profiles().upsert(&actor.user_id, name).await?;
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
