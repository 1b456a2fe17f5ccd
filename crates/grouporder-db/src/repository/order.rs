//! # Order Repository
//!
//! Database operations for orders and their menus.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       One Order, Three Tables                           │
//! │                                                                         │
//! │  orders                  ← title, PIC, status, pricing rules, deadline │
//! │    │                                                                    │
//! │    ├── order_menu_items  ← frozen at creation, ordered by `position`   │
//! │    │                                                                    │
//! │    └── participant_line_items (see line_item.rs)                       │
//! │                                                                         │
//! │  get_by_id() reassembles all three into one `Order` aggregate, which   │
//! │  is exactly what the allocation engine consumes.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::line_item::{LineItemRow, LINE_ITEM_SELECT};
use grouporder_core::{
    DiscountRate, LineItem, MenuItem, Money, NewOrder, Order, OrderStatus, PricingRules,
};

const ORDER_SELECT: &str = r#"
    SELECT
        o.id,
        o.title,
        o.store_name,
        o.created_by,
        o.status,
        o.service_and_delivery_fee_minor,
        o.discount_bps,
        o.max_discount_minor,
        o.min_order_for_discount_minor,
        o.deadline,
        o.created_at,
        o.updated_at
    FROM orders o
"#;

/// Raw `orders` row, before menu and line items are attached.
#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    title: String,
    store_name: String,
    created_by: String,
    status: OrderStatus,
    service_and_delivery_fee_minor: i64,
    discount_bps: u32,
    max_discount_minor: Option<i64>,
    min_order_for_discount_minor: i64,
    deadline: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, menu: Vec<MenuItem>, line_items: Vec<LineItem>) -> Order {
        Order {
            id: self.id,
            title: self.title,
            store_name: self.store_name,
            created_by: self.created_by,
            status: self.status,
            pricing: PricingRules {
                service_and_delivery_fee: Money::from_minor(self.service_and_delivery_fee_minor),
                discount_rate: DiscountRate::from_bps(self.discount_bps),
                max_discount: self.max_discount_minor.map(Money::from_minor),
                min_order_for_discount: Money::from_minor(self.min_order_for_discount_minor),
            },
            menu,
            line_items,
            deadline: self.deadline,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MenuItemRow {
    name: String,
    price_minor: i64,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Creates an OPEN order with its menu.
    ///
    /// The order row and every menu row are written in one transaction;
    /// a failure leaves nothing behind.
    ///
    /// ## Arguments
    /// * `created_by` - User id of the PIC
    /// * `draft` - Already validated order draft
    pub async fn create(&self, created_by: &str, draft: &NewOrder) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, created_by = %created_by, "Creating order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, title, store_name, created_by, status,
                service_and_delivery_fee_minor, discount_bps,
                max_discount_minor, min_order_for_discount_minor,
                deadline, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&id)
        .bind(&draft.title)
        .bind(&draft.store_name)
        .bind(created_by)
        .bind(OrderStatus::Open)
        .bind(draft.pricing.service_and_delivery_fee.minor_units())
        .bind(draft.pricing.discount_rate.bps())
        .bind(draft.pricing.max_discount.map(|cap| cap.minor_units()))
        .bind(draft.pricing.min_order_for_discount.minor_units())
        .bind(draft.deadline)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (position, item) in draft.menu.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_menu_items (id, order_id, position, name, price_minor)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(position as i64)
            .bind(&item.name)
            .bind(item.price.minor_units())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, menu_items = draft.menu.len(), "Order created");

        Ok(Order {
            id,
            title: draft.title.clone(),
            store_name: draft.store_name.clone(),
            created_by: created_by.to_string(),
            status: OrderStatus::Open,
            pricing: draft.pricing,
            menu: draft.menu.clone(),
            line_items: Vec::new(),
            deadline: draft.deadline,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets an order with its menu and line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("{ORDER_SELECT} WHERE o.id = ?1");

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    /// Lists OPEN orders, newest first.
    ///
    /// Deadlines are not filtered here; callers decide what "active" means
    /// relative to their clock.
    pub async fn list_open(&self) -> DbResult<Vec<Order>> {
        let sql = format!("{ORDER_SELECT} WHERE o.status = ?1 ORDER BY o.created_at DESC");

        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(OrderStatus::Open)
            .fetch_all(&self.pool)
            .await?;

        self.hydrate_all(rows).await
    }

    /// Lists CLOSED and CANCELED orders that `user_id` created or joined,
    /// latest deadline first.
    ///
    /// Each order appears once even when the user both created and joined it.
    pub async fn list_history_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let sql = format!(
            r#"{ORDER_SELECT}
            WHERE o.status IN (?1, ?2)
              AND (
                o.created_by = ?3
                OR EXISTS (
                    SELECT 1 FROM participant_line_items li
                    WHERE li.order_id = o.id AND li.user_id = ?3
                )
              )
            "#
        );

        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(OrderStatus::Closed)
            .bind(OrderStatus::Canceled)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut orders = self.hydrate_all(rows).await?;
        orders.sort_by(|a, b| b.deadline.cmp(&a.deadline));
        Ok(orders)
    }

    /// Moves an order from `from` to `to`.
    ///
    /// The update is conditional on the current status, so a concurrent
    /// transition makes this one fail with `NotFound` instead of silently
    /// overwriting it.
    pub async fn update_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<()> {
        debug!(id = %id, from = %from, to = %to, "Updating order status");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("{from} order"), id));
        }

        Ok(())
    }

    async fn hydrate_all(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.hydrate(row).await?);
        }
        Ok(orders)
    }

    async fn hydrate(&self, row: OrderRow) -> DbResult<Order> {
        let menu: Vec<MenuItemRow> = sqlx::query_as(
            r#"
            SELECT name, price_minor
            FROM order_menu_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let sql = format!("{LINE_ITEM_SELECT} WHERE li.order_id = ?1 ORDER BY li.rowid");
        let line_items: Vec<LineItemRow> = sqlx::query_as(&sql)
            .bind(&row.id)
            .fetch_all(&self.pool)
            .await?;

        let menu = menu
            .into_iter()
            .map(|m| MenuItem::new(m.name, Money::from_minor(m.price_minor)))
            .collect();
        let line_items = line_items.into_iter().map(LineItem::from).collect();

        Ok(row.into_order(menu, line_items))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
