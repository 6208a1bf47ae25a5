//! # Order Repository
//!
//! Orders, their items and the stock they reserve.
//!
//! ## Order Creation (all-or-nothing)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├── INSERT orders (status 'Pendente')   takes the write lock first,  │
//! │   │                                       FK failure → client missing  │
//! │   │                                                                     │
//! │   ├── for each line, in request order:                                 │
//! │   │     SELECT product                    missing → NotFound           │
//! │   │     check_line()                      short   → InsufficientStock  │
//! │   │     UPDATE stock = stock - q                                       │
//! │   │       WHERE id = ? AND stock >= q     0 rows  → InsufficientStock  │
//! │   │     INSERT order_item (price snapshot)                             │
//! │   │                                                                     │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction, which rolls back every   │
//! │  decrement and row written so far.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writing the order row before reading any product means the transaction
//! holds SQLite's write lock for its whole read-check-write sequence, so two
//! concurrent orders for the last unit cannot both succeed. The guarded
//! UPDATE backs that up at the statement level.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use super::product::SELECT_PRODUCT_BY_ID;
use crate::error::{DbError, DbResult};
use estilo_core::order::{check_line, insufficient_stock};
use estilo_core::validation::{validate_order_lines, validate_status};
use estilo_core::{
    CoreError, Order, OrderFilter, OrderItem, OrderLineRequest, Product, DEFAULT_ORDER_STATUS,
};

const SELECT_ORDER_BY_ID: &str = r#"
    SELECT id, client_id, status, created_at, updated_at
    FROM orders
    WHERE id = ?1
"#;

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

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates an order for `client_id`, reserving stock for every line.
    ///
    /// ## Returns
    /// * `Ok(Order)` - Committed order with its items
    /// * `Err(DbError::Domain(CoreError::Validation))` - Empty order or non-positive quantity
    /// * `Err(DbError::Domain(CoreError::NotFound))` - Client or a product doesn't exist
    /// * `Err(DbError::Domain(CoreError::InsufficientStock))` - A line asks for more than is on hand
    ///
    /// On any error nothing is written.
    pub async fn create(&self, client_id: i64, lines: &[OrderLineRequest]) -> DbResult<Order> {
        validate_order_lines(lines).map_err(CoreError::from)?;

        let started = Instant::now();
        debug!(client_id, lines = lines.len(), "Creating order");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let now = Utc::now();

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (client_id, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            RETURNING id
            "#,
        )
        .bind(client_id)
        .bind(DEFAULT_ORDER_STATUS)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::ForeignKeyViolation { .. } => {
                DbError::from(CoreError::not_found("Client", client_id))
            }
            other => other,
        })?;

        for line in lines {
            let product = sqlx::query_as::<_, Product>(SELECT_PRODUCT_BY_ID)
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", line.product_id))?;

            let planned = check_line(&product, line).map_err(|e| {
                warn!(
                    order_id,
                    product_id = product.id,
                    available = product.stock,
                    requested = line.quantity,
                    "Insufficient stock, rolling back order"
                );
                e
            })?;

            let reserved = sqlx::query(
                r#"
                UPDATE products
                SET stock = stock - ?1, updated_at = ?2
                WHERE id = ?3 AND stock >= ?1
                "#,
            )
            .bind(planned.quantity)
            .bind(now)
            .bind(planned.product_id)
            .execute(&mut *tx)
            .await?;

            if reserved.rows_affected() != 1 {
                return Err(insufficient_stock(&product, line.quantity).into());
            }

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price_cents)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(order_id)
            .bind(planned.product_id)
            .bind(planned.quantity)
            .bind(planned.price_cents)
            .execute(&mut *tx)
            .await?;

            debug!(
                order_id,
                product_id = planned.product_id,
                quantity = planned.quantity,
                remaining_stock = planned.remaining_stock,
                "Line reserved"
            );
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let order = self
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        info!(
            order_id,
            client_id,
            items = order.items.len(),
            total_cents = ?order.total().map(|t| t.cents()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Order created"
        );

        Ok(order)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets an order with its items.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(SELECT_ORDER_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match order {
            Some(order) => {
                let mut orders = [order];
                self.load_items(&mut orders).await?;
                let [order] = orders;
                Ok(Some(order))
            }
            None => Ok(None),
        }
    }

    /// Lists orders matching every set field of `filter`, ordered by id.
    ///
    /// ## Filter Mapping
    /// ```text
    /// client_id     → o.client_id = ?
    /// created_from  → o.created_at >= ?
    /// created_to    → o.created_at <= ?
    /// section       → EXISTS item whose product is in the section
    /// status        → o.status = ?
    /// order_id      → o.id = ?
    /// ```
    pub async fn list(&self, filter: &OrderFilter) -> DbResult<Vec<Order>> {
        debug!(?filter, "Listing orders");

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT o.id, o.client_id, o.status, o.created_at, o.updated_at FROM orders o WHERE 1 = 1",
        );

        if let Some(client_id) = filter.client_id {
            qb.push(" AND o.client_id = ").push_bind(client_id);
        }
        if let Some(from) = filter.created_from {
            qb.push(" AND o.created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.created_to {
            qb.push(" AND o.created_at <= ").push_bind(to);
        }
        if let Some(section) = &filter.section {
            qb.push(
                " AND EXISTS (SELECT 1 FROM order_items oi \
                 JOIN products p ON p.id = oi.product_id \
                 WHERE oi.order_id = o.id AND p.section = ",
            )
            .push_bind(section.clone())
            .push(")");
        }
        if let Some(status) = &filter.status {
            qb.push(" AND o.status = ").push_bind(status.clone());
        }
        if let Some(order_id) = filter.order_id {
            qb.push(" AND o.id = ").push_bind(order_id);
        }

        qb.push(" ORDER BY o.id");

        let mut orders = qb.build_query_as::<Order>().fetch_all(&self.pool).await?;
        self.load_items(&mut orders).await?;

        Ok(orders)
    }

    /// Fills `items` on every order with one `IN (...)` query.
    async fn load_items(&self, orders: &mut [Order]) -> DbResult<()> {
        if orders.is_empty() {
            return Ok(());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT id, order_id, product_id, quantity, price_cents FROM order_items WHERE order_id IN (",
        );
        let mut ids = qb.separated(", ");
        for order in orders.iter() {
            ids.push_bind(order.id);
        }
        ids.push_unseparated(") ORDER BY id");

        let items = qb.build_query_as::<OrderItem>().fetch_all(&self.pool).await?;

        let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        for order in orders.iter_mut() {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }

        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Sets an order's status. `None` leaves the order as it is.
    ///
    /// Items and stock are never touched.
    pub async fn update_status(&self, id: i64, status: Option<&str>) -> DbResult<Order> {
        if let Some(status) = status {
            let status = status.trim();
            validate_status(status).map_err(CoreError::from)?;

            debug!(id, status, "Updating order status");

            let result = sqlx::query("UPDATE orders SET status = ?2, updated_at = ?3 WHERE id = ?1")
                .bind(id)
                .bind(status)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(DbError::not_found("Order", id));
            }
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Deletes an order; its items go with it (ON DELETE CASCADE).
    ///
    /// Reserved stock is not returned to the products.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        info!(order_id = id, "Order deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
