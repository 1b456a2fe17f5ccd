//! # Line Item Repository
//!
//! Database operations for participant line items.
//!
//! ## Merge-on-insert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 (order, user, item) is a merge key                      │
//! │                                                                         │
//! │  alice joins with 1× Es Teh ──► INSERT row (qty 1)                     │
//! │  alice joins with 2× Es Teh ──► ON CONFLICT DO UPDATE (qty 1 + 2 = 3)  │
//! │  bob   joins with 1× Es Teh ──► INSERT row (qty 1)                     │
//! │                                                                         │
//! │  The merge happens inside SQLite in a single statement, so two         │
//! │  concurrent submissions for the same key can never produce two rows    │
//! │  or lose a quantity.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use grouporder_core::{LineItem, Money, PaymentStatus, ProposedLineItem};

/// Column list shared by every line item read; joins the participant's
/// profile for their display name.
pub(crate) const LINE_ITEM_SELECT: &str = r#"
    SELECT
        li.id,
        li.order_id,
        li.user_id,
        p.full_name AS user_name,
        li.item_name,
        li.item_price_minor,
        li.quantity,
        li.payment_status,
        li.created_at,
        li.updated_at
    FROM participant_line_items li
    LEFT JOIN profiles p ON p.id = li.user_id
"#;

/// Raw `participant_line_items` row.
#[derive(Debug, FromRow)]
pub(crate) struct LineItemRow {
    id: String,
    order_id: String,
    user_id: String,
    user_name: Option<String>,
    item_name: String,
    item_price_minor: i64,
    quantity: i64,
    payment_status: PaymentStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        LineItem {
            id: row.id,
            order_id: row.order_id,
            user_id: row.user_id,
            user_name: row.user_name,
            item_name: row.item_name,
            item_price: Money::from_minor(row.item_price_minor),
            quantity: row.quantity,
            payment_status: row.payment_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for participant line items.
#[derive(Debug, Clone)]
pub struct LineItemRepository {
    pool: SqlitePool,
}

impl LineItemRepository {
    /// Creates a new LineItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LineItemRepository { pool }
    }

    /// Gets a line item by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<LineItem>> {
        let sql = format!("{LINE_ITEM_SELECT} WHERE li.id = ?1");

        let row: Option<LineItemRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(LineItem::from))
    }

    /// Lists an order's line items in insertion order.
    pub async fn list_for_order(&self, order_id: &str) -> DbResult<Vec<LineItem>> {
        let sql = format!("{LINE_ITEM_SELECT} WHERE li.order_id = ?1 ORDER BY li.rowid");

        let rows: Vec<LineItemRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(LineItem::from).collect())
    }

    /// Adds a proposed line item, merging into an existing row for the same
    /// `(order_id, user_id, item_name)` by summing quantities.
    ///
    /// A merged row keeps its original id, price snapshot and payment status.
    ///
    /// ## Returns
    /// The row as stored after the merge.
    pub async fn add_or_merge(
        &self,
        order_id: &str,
        item: &ProposedLineItem,
    ) -> DbResult<LineItem> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            order_id = %order_id,
            user_id = %item.user_id,
            item_name = %item.item_name,
            quantity = item.quantity,
            "Upserting line item"
        );

        sqlx::query(
            r#"
            INSERT INTO participant_line_items (
                id, order_id, user_id, item_name, item_price_minor,
                quantity, payment_status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (order_id, user_id, item_name) DO UPDATE SET
                quantity = participant_line_items.quantity + excluded.quantity,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(order_id)
        .bind(&item.user_id)
        .bind(&item.item_name)
        .bind(item.item_price.minor_units())
        .bind(item.quantity)
        .bind(PaymentStatus::Unpaid)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let sql = format!(
            "{LINE_ITEM_SELECT} WHERE li.order_id = ?1 AND li.user_id = ?2 AND li.item_name = ?3"
        );

        let row: Option<LineItemRow> = sqlx::query_as(&sql)
            .bind(order_id)
            .bind(&item.user_id)
            .bind(&item.item_name)
            .fetch_optional(&self.pool)
            .await?;

        // Only reachable if the order was deleted between the two statements
        row.map(LineItem::from)
            .ok_or_else(|| DbError::not_found("LineItem", format!("{order_id}/{}", item.user_id)))
    }

    /// Sets a line item's quantity.
    ///
    /// A quantity of zero or less deletes the row and returns `None`.
    pub async fn update_quantity(&self, id: &str, quantity: i64) -> DbResult<Option<LineItem>> {
        if quantity <= 0 {
            self.delete(id).await?;
            return Ok(None);
        }

        debug!(id = %id, quantity, "Updating line item quantity");

        let result = sqlx::query(
            r#"
            UPDATE participant_line_items
            SET quantity = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LineItem", id));
        }

        self.get_by_id(id).await
    }

    /// Records whether the participant has paid for a line item.
    pub async fn set_payment_status(&self, id: &str, status: PaymentStatus) -> DbResult<LineItem> {
        debug!(id = %id, status = %status, "Setting payment status");

        let result = sqlx::query(
            r#"
            UPDATE participant_line_items
            SET payment_status = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LineItem", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("LineItem", id))
    }

    /// Deletes a line item.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting line item");

        let result = sqlx::query("DELETE FROM participant_line_items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("LineItem", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
