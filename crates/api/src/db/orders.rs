//! `PostgreSQL` order repository.
//!
//! Orders and items are read with two queries (orders, then all their items by
//! `order_id = ANY(..)`) and stitched together in memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use cleanpro_core::{
    Email, OrderCode, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus,
    PhoneNumber,
};

use super::{OrderStore, RepositoryError};
use crate::models::{NewOrder, Order, OrderItem, OrderPatch, OrderStats, UpdatedOrder};

const ORDER_COLUMNS: &str = "id, order_code, client_name, client_phone, client_email, status, \
     payment_method, payment_status, total_amount, created_at, updated_at";

/// Repository for order database operations.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_code: String,
    client_name: String,
    client_phone: String,
    client_email: Option<String>,
    status: String,
    payment_method: String,
    payment_status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: OrderItemId,
    order_id: OrderId,
    #[sqlx(rename = "type")]
    item_type: String,
    quantity: i32,
    price: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            RepositoryError::DataCorruption(format!("invalid {field} in database: {e}"))
        };

        Ok(Order {
            id: self.id,
            order_code: OrderCode::from_stored(self.order_code),
            client_name: self.client_name,
            client_phone: PhoneNumber::parse(&self.client_phone)
                .map_err(|e| corrupt("client_phone", &e))?,
            client_email: self
                .client_email
                .map(|raw| Email::parse(&raw))
                .transpose()
                .map_err(|e| corrupt("client_email", &e))?,
            status: self
                .status
                .parse::<OrderStatus>()
                .map_err(|e| corrupt("status", &e))?,
            payment_method: self
                .payment_method
                .parse::<PaymentMethod>()
                .map_err(|e| corrupt("payment_method", &e))?,
            payment_status: self
                .payment_status
                .parse::<PaymentStatus>()
                .map_err(|e| corrupt("payment_status", &e))?,
            total_amount: self.total_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

impl From<ItemRow> for OrderItem {
    fn from(r: ItemRow) -> Self {
        Self {
            id: r.id,
            item_type: r.item_type,
            quantity: r.quantity,
            price: r.price,
        }
    }
}

/// Load the items for `rows` and assemble full orders, keeping row order.
async fn attach_items(
    conn: &mut PgConnection,
    rows: Vec<OrderRow>,
) -> Result<Vec<Order>, RepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
    let item_rows = sqlx::query_as::<_, ItemRow>(
        r"
        SELECT id, order_id, type, quantity, price
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY id
        ",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in item_rows {
        by_order.entry(item.order_id).or_default().push(item.into());
    }

    rows.into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

async fn fetch_order(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(attach_items(conn, vec![row]).await?.pop())
}

/// Escape `%`, `_` and `\` so user input matches literally in `LIKE`.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

#[async_trait]
impl OrderStore for PgOrderRepository {
    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        attach_items(&mut conn, rows).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, id).await
    }

    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            INSERT INTO orders (order_code, client_name, client_phone, client_email,
                                status, payment_method, payment_status, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.order_code.as_str())
        .bind(&order.client_name)
        .bind(order.client_phone.as_str())
        .bind(order.client_email.as_ref().map(Email::as_str))
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.total_amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "order code"))?;

        // All items in one round trip
        let types: Vec<&str> = order.items.iter().map(|i| i.item_type.as_str()).collect();
        let quantities: Vec<i32> = order.items.iter().map(|i| i.quantity).collect();
        let prices: Vec<Decimal> = order.items.iter().map(|i| i.price).collect();

        let mut items: Vec<OrderItem> = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO order_items (order_id, type, quantity, price)
            SELECT $1, t.type, t.quantity, t.price
            FROM UNNEST($2::text[], $3::int4[], $4::numeric[]) AS t(type, quantity, price)
            RETURNING id, order_id, type, quantity, price
            ",
        )
        .bind(row.id)
        .bind(&types)
        .bind(&quantities)
        .bind(&prices)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
        items.sort_by_key(|i| i.id);

        // Decode before commit so a corrupt row rolls the insert back
        let created = row.into_order(items)?;
        tx.commit().await?;

        Ok(created)
    }

    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<UpdatedOrder>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let previous: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(previous) = previous else {
            return Ok(None);
        };
        let previous_status = previous.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        sqlx::query(
            r"
            UPDATE orders SET
                status = COALESCE($2, status),
                payment_method = COALESCE($3, payment_method),
                payment_status = COALESCE($4, payment_status),
                client_name = COALESCE($5, client_name),
                client_phone = COALESCE($6, client_phone),
                client_email = CASE WHEN $7 THEN $8 ELSE client_email END,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(patch.status.map(OrderStatus::as_str))
        .bind(patch.payment_method.map(PaymentMethod::as_str))
        .bind(patch.payment_status.map(PaymentStatus::as_str))
        .bind(patch.client_name.as_deref())
        .bind(patch.client_phone.as_ref().map(PhoneNumber::as_str))
        .bind(patch.client_email.is_some())
        .bind(patch.client_email.as_ref().and_then(|e| e.as_ref().map(Email::as_str)))
        .execute(&mut *tx)
        .await?;

        let order = fetch_order(&mut tx, id)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(Some(UpdatedOrder {
            previous_status,
            order,
        }))
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        // order_items rows go with the order via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: &str) -> Result<Vec<Order>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(query));

        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE order_code ILIKE $1 ESCAPE '\'
               OR client_name ILIKE $1 ESCAPE '\'
               OR client_phone ILIKE $1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(&pattern)
        .fetch_all(&mut *conn)
        .await?;

        attach_items(&mut conn, rows).await
    }

    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepositoryError> {
        let (today_orders, pending_orders, today_income, unpaid_amount): (
            i64,
            i64,
            Decimal,
            Decimal,
        ) = sqlx::query_as(
            r"
            SELECT
                COUNT(*) FILTER (WHERE (created_at AT TIME ZONE 'UTC')::date = $1),
                COUNT(*) FILTER (WHERE status <> 'Picked Up'),
                COALESCE(SUM(total_amount) FILTER (
                    WHERE (created_at AT TIME ZONE 'UTC')::date = $1 AND payment_status = 'Paid'
                ), 0),
                COALESCE(SUM(total_amount) FILTER (WHERE payment_status = 'Unpaid'), 0)
            FROM orders
            ",
        )
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderStats {
            today_orders,
            pending_orders,
            today_income,
            unpaid_amount,
        })
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
