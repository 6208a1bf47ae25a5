//! HTTP routes.
//!
//! ## Route Table
//! ```text
//! GET    /                                  liveness
//! /api/v1
//! ├── /auth      register · login · refresh-token · me · users (admin)
//! ├── /clients   list · get (user)      create · update · delete (admin)
//! ├── /products  list · get (public)    create · update · delete · restock (admin)
//! └── /orders    create · list · get (user, gated)   update · delete (admin)
//! ```

pub mod auth;
pub mod clients;
pub mod orders;
pub mod products;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/clients", clients::routes())
        .nest("/products", products::routes())
        .nest("/orders", orders::routes());

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Lu Estilo API is running" }))
}
