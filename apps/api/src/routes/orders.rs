//! Order routes.
//!
//! Handlers only translate HTTP into [`OrderService`](crate::services::order_service::OrderService)
//! calls; ownership checks and stock reservation live behind it.
//!
//! ## Date Range
//! ```text
//! ?start_date=2026-03-01&end_date=2026-03-31
//!        │                       │
//!        ▼                       ▼
//! 2026-03-01T00:00:00Z  ..=  2026-03-31T23:59:59.999999999Z
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::auth::Authenticated;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use estilo_core::{Order, OrderFilter, OrderLineRequest};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route(
            "/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
}

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Required for administrators, ignored for customers.
    #[serde(default)]
    pub client_id: Option<i64>,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListParams {
    pub client_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub section: Option<String>,
    pub status: Option<String>,
    pub order_id: Option<i64>,
}

impl OrderListParams {
    /// Turns calendar dates into an inclusive UTC range.
    pub fn into_filter(self) -> ApiResult<OrderFilter> {
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ApiError::bad_request("start_date must not be after end_date"));
            }
        }

        let created_to = match self.end_date {
            Some(date) => Some(end_of_day(date)?),
            None => None,
        };

        Ok(OrderFilter {
            client_id: self.client_id,
            created_from: self.start_date.map(start_of_day),
            created_to,
            section: non_blank(self.section),
            status: non_blank(self.status),
            order_id: self.order_id,
        })
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> ApiResult<DateTime<Utc>> {
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid end_date: {date}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Json(body): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state
        .orders
        .create_order(&auth.principal, body.client_id, &body.items)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Query(params): Query<OrderListParams>,
) -> ApiResult<Json<Vec<Order>>> {
    let filter = params.into_filter()?;
    let orders = state.orders.list_orders(&auth.principal, filter).await?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    let order = state.orders.get_order(&auth.principal, id).await?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
    Json(body): Json<UpdateOrderRequest>,
) -> ApiResult<Json<Order>> {
    let order = state
        .orders
        .update_order(&auth.principal, id, body.status.as_deref())
        .await?;

    Ok(Json(order))
}

async fn delete_order(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.orders.delete_order(&auth.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::*;
    use crate::test_support::{request, send, TestApp};

    #[test]
    fn test_date_range_is_inclusive() {
        let params = OrderListParams {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 31),
            section: Some("  ".to_string()),
            ..Default::default()
        };

        let filter = params.into_filter().unwrap();

        assert_eq!(filter.created_from.unwrap().to_rfc3339(), "2026-03-01T00:00:00+00:00");
        let to = filter.created_to.unwrap();
        assert_eq!(to.date_naive(), NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(to.time(), NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap());
        assert_eq!(filter.section, None);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let params = OrderListParams {
            start_date: NaiveDate::from_ymd_opt(2026, 3, 2),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            ..Default::default()
        };

        let err = params.into_filter().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_order_reserves_stock_and_snapshots_price() {
        let mut app = TestApp::new().await;
        let admin = app.admin_token().await;
        let client = app.client("maria@example.com", "12345678901").await;
        let product = app.product("789100", 9990, 5).await;

        let (status, order) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&admin),
                Some(json!({"client_id": client.id, "items": [{"product_id": product.id, "quantity": 2}]})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["client_id"], client.id);
        assert_eq!(order["status"], "Pendente");
        assert_eq!(order["items"][0]["quantity"], 2);
        assert_eq!(order["items"][0]["price_cents"], 9990);

        let (_, fetched) = send(&app.router, request(Method::GET, &format!("/api/v1/products/{}", product.id), None, None)).await;
        assert_eq!(fetched["stock"], 3);

        let (contact, message) = tokio::time::timeout(Duration::from_secs(2), app.notifications.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(contact, "5511999990000");
        assert!(message.contains(&format!("#{}", order["id"])));
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_conflict_and_writes_nothing() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let client = app.client("maria@example.com", "12345678901").await;
        let product = app.product("789100", 9990, 1).await;

        let (status, body) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&admin),
                Some(json!({"client_id": client.id, "items": [{"product_id": product.id, "quantity": 2}]})),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");

        let (_, fetched) = send(&app.router, request(Method::GET, &format!("/api/v1/products/{}", product.id), None, None)).await;
        assert_eq!(fetched["stock"], 1);

        let (_, orders) = send(&app.router, request(Method::GET, "/api/v1/orders", Some(&admin), None)).await;
        assert!(orders.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bad_lines_and_missing_references() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let client = app.client("maria@example.com", "12345678901").await;

        let (status, _) = send(
            &app.router,
            request(Method::POST, "/api/v1/orders", Some(&admin), Some(json!({"client_id": client.id, "items": []}))),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&admin),
                Some(json!({"client_id": client.id, "items": [{"product_id": 999, "quantity": 1}]})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app.router,
            request(Method::POST, "/api/v1/orders", Some(&admin), Some(json!({"items": [{"product_id": 1, "quantity": 1}]}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_customer_orders_for_own_client_only() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (mine, customer) = app.customer("maria@example.com", "12345678901").await;
        let other = app.client("joana@example.com", "98765432100").await;
        let product = app.product("789100", 1000, 10).await;

        // The requested client is ignored for customers.
        let (status, order) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&customer),
                Some(json!({"client_id": other.id, "items": [{"product_id": product.id, "quantity": 1}]})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["client_id"], mine.id);

        let (status, foreign) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&admin),
                Some(json!({"client_id": other.id, "items": [{"product_id": product.id, "quantity": 1}]})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, list) = send(
            &app.router,
            request(Method::GET, &format!("/api/v1/orders?client_id={}", other.id), Some(&customer), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["client_id"], mine.id);

        let (status, _) = send(
            &app.router,
            request(Method::GET, &format!("/api/v1/orders/{}", foreign["id"]), Some(&customer), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, all) = send(&app.router, request(Method::GET, "/api/v1/orders", Some(&admin), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let client = app.client("maria@example.com", "12345678901").await;
        let product = app.product("789100", 1000, 10).await;

        let (_, order) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&admin),
                Some(json!({"client_id": client.id, "items": [{"product_id": product.id, "quantity": 1}]})),
            ),
        )
        .await;

        let (_, list) = send(&app.router, request(Method::GET, "/api/v1/orders?section=Feminino&status=Pendente", Some(&admin), None)).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (_, list) = send(&app.router, request(Method::GET, "/api/v1/orders?section=Masculino", Some(&admin), None)).await;
        assert!(list.as_array().unwrap().is_empty());

        let (_, list) = send(
            &app.router,
            request(Method::GET, &format!("/api/v1/orders?order_id={}", order["id"]), Some(&admin), None),
        )
        .await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (_, list) = send(&app.router, request(Method::GET, "/api/v1/orders?start_date=2000-01-01&end_date=2000-12-31", Some(&admin), None)).await;
        assert!(list.as_array().unwrap().is_empty());

        let (status, _) = send(&app.router, request(Method::GET, "/api/v1/orders?start_date=2001-01-01&end_date=2000-01-01", Some(&admin), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_status_update_notifies_and_delete_is_admin_only() {
        let mut app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (client, customer) = app.customer("maria@example.com", "12345678901").await;
        let product = app.product("789100", 1000, 10).await;

        let (_, order) = send(
            &app.router,
            request(
                Method::POST,
                "/api/v1/orders",
                Some(&admin),
                Some(json!({"client_id": client.id, "items": [{"product_id": product.id, "quantity": 1}]})),
            ),
        )
        .await;
        let uri = format!("/api/v1/orders/{}", order["id"]);

        // Drain the confirmation.
        tokio::time::timeout(Duration::from_secs(2), app.notifications.recv())
            .await
            .unwrap()
            .unwrap();

        let (status, _) = send(&app.router, request(Method::PUT, &uri, Some(&customer), Some(json!({"status": "shipped"})))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, updated) = send(&app.router, request(Method::PUT, &uri, Some(&admin), Some(json!({"status": "shipped"})))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "shipped");

        let (_, message) = tokio::time::timeout(Duration::from_secs(2), app.notifications.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(message.contains("shipped"));

        let (status, _) = send(&app.router, request(Method::PUT, &uri, Some(&admin), Some(json!({"status": "   "})))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app.router, request(Method::DELETE, &uri, Some(&customer), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app.router, request(Method::DELETE, &uri, Some(&admin), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app.router, request(Method::GET, &uri, Some(&admin), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
