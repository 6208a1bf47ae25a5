//! Authentication routes.
//!
//! ## Token Flow
//! ```text
//! POST /auth/login  (form: username=<email>, password)
//!      │
//!      ▼
//! { access_token (30 min), refresh_token (7 days), token_type: "bearer" }
//!      │
//!      │  access token expired
//!      ▼
//! POST /auth/refresh-token  { refresh_token }  ──►  new access token
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Form, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, Authenticated};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use estilo_core::access::require_admin;
use estilo_core::validation::{validate_email, validate_required, ValidationResult};
use estilo_core::{NewUser, User, UserUpdate, ValidationError};

const MIN_PASSWORD_LEN: usize = 6;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/me", get(me))
        .route("/users", post(create_user))
        .route("/users/{id}", patch(update_user))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Account as returned by the API. Never includes the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            is_admin: user.is_admin,
            client_id: user.client_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: &'static str,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// OAuth2 password-style login form; `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub client_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    /// Absent keeps the link; `null` unlinks.
    #[serde(deserialize_with = "present")]
    pub client_id: Option<Option<i64>>,
}

/// Marks a field as present, so an explicit `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_password(password: &str) -> ValidationResult<()> {
    validate_required("password", password, 128)?;

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!("must be at least {} characters", MIN_PASSWORD_LEN),
        });
    }

    Ok(())
}

fn validate_account(username: &str, email: &str, password: &str) -> ValidationResult<()> {
    validate_required("username", username, 100)?;
    validate_email(email)?;
    validate_password(password)
}

// =============================================================================
// Handlers
// =============================================================================

/// Public sign-up. The account is a non-admin with no client link.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    validate_account(&body.username, &body.email, &body.password)?;

    let user = state
        .db
        .users()
        .insert(&NewUser {
            username: body.username,
            email: body.email,
            hashed_password: hash_password(&body.password)?,
            is_admin: false,
            client_id: None,
        })
        .await?;

    info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::unauthorized("Incorrect email or password");

    let user = state
        .db
        .users()
        .get_by_email(&form.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&form.password, &user.hashed_password) {
        warn!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("Inactive user"));
    }

    info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token: state.jwt.generate_access_token(user.id)?,
        refresh_token: Some(state.jwt.generate_refresh_token(user.id)?),
        token_type: "bearer",
        expires_in: state.jwt.access_lifetime_secs(),
    }))
}

async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let claims = state.jwt.validate_refresh_token(&body.refresh_token)?;

    let user = state
        .db
        .users()
        .get_by_id(claims.user_id()?)
        .await?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

    Ok(Json(TokenResponse {
        access_token: state.jwt.generate_access_token(user.id)?,
        refresh_token: None,
        token_type: "bearer",
        expires_in: state.jwt.access_lifetime_secs(),
    }))
}

async fn me(auth: Authenticated) -> Json<UserProfile> {
    Json(UserProfile::from(&auth.user))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    require_admin(&auth.principal)?;
    validate_account(&body.username, &body.email, &body.password)?;

    let user = state
        .db
        .users()
        .insert(&NewUser {
            username: body.username,
            email: body.email,
            hashed_password: hash_password(&body.password)?,
            is_admin: body.is_admin,
            client_id: body.client_id,
        })
        .await?;

    info!(user_id = user.id, is_admin = user.is_admin, by = auth.user.id, "User created");
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(id): Path<i64>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    require_admin(&auth.principal)?;

    let hashed_password = match body.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let user = state
        .db
        .users()
        .update(
            id,
            &UserUpdate {
                hashed_password,
                is_active: body.is_active,
                is_admin: body.is_admin,
                client_id: body.client_id,
            },
        )
        .await?;

    info!(user_id = user.id, by = auth.user.id, "User updated");
    Ok(Json(UserProfile::from(&user)))
}
