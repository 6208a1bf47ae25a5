//! Client directory routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::auth::Authenticated;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use estilo_core::access::require_admin;
use estilo_core::validation::normalize_page;
use estilo_core::{Client, ClientUpdate, NewClient};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/{id}",
            get(get_client).put(update_client).delete(delete_client),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn list_clients(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    Query(params): Query<ClientListParams>,
) -> ApiResult<Json<Vec<Client>>> {
    let (skip, limit) = normalize_page(params.skip, params.limit);

    let clients = state
        .db
        .clients()
        .list(skip, limit, params.name.as_deref(), params.email.as_deref())
        .await?;

    Ok(Json(clients))
}

async fn create_client(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Json(body): Json<NewClient>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    require_admin(&auth.principal)?;
    body.validate()?;

    let client = state.db.clients().insert(&body).await?;

    info!(client_id = client.id, by = auth.user.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

async fn get_client(
    State(state): State<Arc<AppState>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> ApiResult<Json<Client>> {
    let client = state
        .db
        .clients()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client", id))?;

    Ok(Json(client))
}

async fn update_client(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
    Json(body): Json<ClientUpdate>,
) -> ApiResult<Json<Client>> {
    require_admin(&auth.principal)?;
    body.validate()?;

    let client = state.db.clients().update(id, &body).await?;

    info!(client_id = id, by = auth.user.id, "Client updated");
    Ok(Json(client))
}

async fn delete_client(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_admin(&auth.principal)?;

    state.db.clients().delete(id).await?;

    info!(client_id = id, by = auth.user.id, "Client deleted");
    Ok(StatusCode::NO_CONTENT)
}
