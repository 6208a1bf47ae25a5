//! Catalog routes. Reads are public; writes need an administrator.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::auth::Authenticated;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use estilo_core::access::require_admin;
use estilo_core::validation::normalize_page;
use estilo_core::{NewProduct, Product, ProductUpdate};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/restock", post(restock_product))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub section: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProductListParams>,
) -> ApiResult<Json<Vec<Product>>> {
    let (skip, limit) = normalize_page(params.skip, params.limit);

    let products = state
        .db
        .products()
        .list(skip, limit, params.section.as_deref())
        .await?;

    Ok(Json(products))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Json(body): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    require_admin(&auth.principal)?;
    body.validate()?;

    let product = state.db.products().insert(&body).await?;

    info!(product_id = product.id, barcode = %product.barcode, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    Ok(Json(product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
    Json(body): Json<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    require_admin(&auth.principal)?;
    body.validate()?;

    let product = state.db.products().update(id, &body).await?;

    info!(product_id = id, "Product updated");
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_admin(&auth.principal)?;

    state.db.products().delete(id).await?;

    info!(product_id = id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn restock_product(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
    Json(body): Json<RestockRequest>,
) -> ApiResult<Json<Product>> {
    require_admin(&auth.principal)?;

    let product = state.db.products().restock(id, body.quantity).await?;

    info!(product_id = id, added = body.quantity, stock = product.stock, "Product restocked");
    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{request, send, TestApp};

    fn vestido() -> serde_json::Value {
        json!({
            "description": "Vestido floral",
            "price_cents": 9990,
            "barcode": "7891234567890",
            "section": "Feminino",
            "stock": 5,
            "expiration_date": "2027-01-31"
        })
    }

    #[tokio::test]
    async fn test_admin_creates_and_public_reads() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;

        let (status, created) = send(&app.router, request(Method::POST, "/api/v1/products", Some(&admin), Some(vestido()))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["available"], true);
        assert_eq!(created["expiration_date"], "2027-01-31");
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app.router, request(Method::GET, &format!("/api/v1/products/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["price_cents"], 9990);

        let (status, list) = send(&app.router, request(Method::GET, "/api/v1/products?section=Feminino", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, list) = send(&app.router, request(Method::GET, "/api/v1/products?section=Masculino", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_require_admin() {
        let app = TestApp::new().await;
        let (_, customer) = app.customer("maria@example.com", "12345678901").await;

        let (status, _) = send(&app.router, request(Method::POST, "/api/v1/products", None, Some(vestido()))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app.router, request(Method::POST, "/api/v1/products", Some(&customer), Some(vestido()))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_duplicate_barcode_and_validation() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        send(&app.router, request(Method::POST, "/api/v1/products", Some(&admin), Some(vestido()))).await;

        let (status, _) = send(&app.router, request(Method::POST, "/api/v1/products", Some(&admin), Some(vestido()))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let mut negative = vestido();
        negative["barcode"] = json!("other");
        negative["price_cents"] = json!(-1);
        let (status, _) = send(&app.router, request(Method::POST, "/api/v1/products", Some(&admin), Some(negative))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_keeps_stock_and_restock_adds() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let product = app.product("789100", 9990, 5).await;

        let (status, updated) = send(
            &app.router,
            request(
                Method::PUT,
                &format!("/api/v1/products/{}", product.id),
                Some(&admin),
                Some(json!({
                    "description": "Vestido floral (novo)",
                    "price_cents": 12990,
                    "barcode": "789100",
                    "section": "Feminino"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price_cents"], 12990);
        assert_eq!(updated["stock"], 5);

        let (status, restocked) = send(
            &app.router,
            request(
                Method::POST,
                &format!("/api/v1/products/{}/restock", product.id),
                Some(&admin),
                Some(json!({"quantity": 3})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(restocked["stock"], 8);

        let (status, _) = send(
            &app.router,
            request(
                Method::POST,
                &format!("/api/v1/products/{}/restock", product.id),
                Some(&admin),
                Some(json!({"quantity": 0})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let product = app.product("789100", 9990, 5).await;

        let uri = format!("/api/v1/products/{}", product.id);
        let (status, _) = send(&app.router, request(Method::DELETE, &uri, Some(&admin), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app.router, request(Method::GET, &uri, None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
