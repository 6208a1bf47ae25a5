//! Order workflow service.
//!
//! Ties the access gate, the transactional repository and the notification
//! dispatcher together. Handlers stay thin; every order rule runs here.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolve_order_owner(principal, client_id?)   BadRequest if unscoped   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.orders().create(owner, lines)             one SQLite transaction   │
//! │       │                                                                 │
//! │       ▼  (committed)                                                    │
//! │  client has phone? ── yes ──► dispatcher.dispatch(phone, confirmation) │
//! │       │                        (background, failures only logged)      │
//! │       ▼                                                                 │
//! │  Order with items                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use super::notification_service::NotificationDispatcher;
use crate::error::{ApiError, ApiResult};
use estilo_core::access::{authorize_order_read, require_admin, resolve_order_owner, scope_order_filter};
use estilo_core::order::{confirmation_message, status_change_message};
use estilo_core::{Order, OrderFilter, OrderLineRequest, Principal};
use estilo_db::Database;

/// Order workflow service.
#[derive(Clone)]
pub struct OrderService {
    db: Database,
    notifications: NotificationDispatcher,
}

impl OrderService {
    pub fn new(db: Database, notifications: NotificationDispatcher) -> Self {
        OrderService { db, notifications }
    }

    /// Creates an order for the client the principal acts as.
    ///
    /// Admins must name `requested_client`; customers always order for their
    /// own linked client.
    pub async fn create_order(
        &self,
        principal: &Principal,
        requested_client: Option<i64>,
        lines: &[OrderLineRequest],
    ) -> ApiResult<Order> {
        let client_id = resolve_order_owner(principal, requested_client)?;

        let order = self.db.orders().create(client_id, lines).await?;

        info!(
            order_id = order.id,
            client_id,
            user_id = principal.user_id,
            "Order placed"
        );

        self.notify_client(&order, confirmation_message).await;
        Ok(order)
    }

    /// Fetches one order the principal is allowed to see.
    pub async fn get_order(&self, principal: &Principal, order_id: i64) -> ApiResult<Order> {
        let order = self
            .db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", order_id))?;

        authorize_order_read(principal, &order)?;
        Ok(order)
    }

    /// Lists orders; customers only ever see their own client's orders.
    pub async fn list_orders(&self, principal: &Principal, filter: OrderFilter) -> ApiResult<Vec<Order>> {
        match scope_order_filter(principal, filter) {
            Some(filter) => Ok(self.db.orders().list(&filter).await?),
            None => {
                debug!(user_id = principal.user_id, "No client linked, empty order list");
                Ok(Vec::new())
            }
        }
    }

    /// Changes an order's status (admin only). `None` returns it unchanged.
    pub async fn update_order(
        &self,
        principal: &Principal,
        order_id: i64,
        status: Option<&str>,
    ) -> ApiResult<Order> {
        require_admin(principal)?;

        let order = self.db.orders().update_status(order_id, status).await?;

        if status.is_some() {
            info!(order_id, status = %order.status, "Order status changed");
            self.notify_client(&order, status_change_message).await;
        }

        Ok(order)
    }

    /// Deletes an order and its items (admin only).
    pub async fn delete_order(&self, principal: &Principal, order_id: i64) -> ApiResult<()> {
        require_admin(principal)?;

        self.db.orders().delete(order_id).await?;
        Ok(())
    }

    /// Looks up the owning client and hands the message to the dispatcher.
    ///
    /// Runs after the order is committed; nothing here can fail the request.
    async fn notify_client(&self, order: &Order, compose: fn(&str, &Order) -> String) {
        let client = match self.db.clients().get_by_id(order.client_id).await {
            Ok(Some(client)) => client,
            Ok(None) => return,
            Err(e) => {
                warn!(order_id = order.id, error = %e, "Could not load client for notification");
                return;
            }
        };

        match client.phone.as_deref().map(str::trim) {
            Some(phone) if !phone.is_empty() => {
                self.notifications
                    .dispatch(phone.to_string(), compose(&client.name, order));
            }
            _ => debug!(client_id = client.id, "Client has no phone, skipping notification"),
        }
    }
}
