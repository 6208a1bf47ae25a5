//! JWT authentication module.
//!
//! Handles token generation and validation, password hashing, and resolving
//! the acting [`Principal`] of a request.
//!
//! ## Request Authentication
//! ```text
//! Authorization: Bearer <access token>
//!      │
//!      ▼
//! JwtManager::validate_access_token  ── bad / expired / refresh token ──► 401
//!      │ sub = user id
//!      ▼
//! users.get_by_id                    ── unknown or inactive ────────────► 401
//!      │
//!      ▼
//! Authenticated { user, principal }
//! ```

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use estilo_core::{Principal, User};

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,

    /// Token type ("access" or "refresh")
    pub token_type: String,
}

impl Claims {
    /// The user id carried in `sub`.
    pub fn user_id(&self) -> ApiResult<i64> {
        self.sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid token subject"))
    }
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    access_lifetime_secs: i64,
    refresh_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, access_lifetime_secs: i64, refresh_lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            access_lifetime_secs,
            refresh_lifetime_secs,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    /// Generate an access token.
    pub fn generate_access_token(&self, user_id: i64) -> ApiResult<String> {
        self.generate(user_id, ACCESS, self.access_lifetime_secs)
    }

    /// Generate a refresh token.
    pub fn generate_refresh_token(&self, user_id: i64) -> ApiResult<String> {
        self.generate(user_id, REFRESH, self.refresh_lifetime_secs)
    }

    fn generate(&self, user_id: i64, token_type: &str, lifetime_secs: i64) -> ApiResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(lifetime_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate {} token: {}", token_type, e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Validate that a token is an access token.
    pub fn validate_access_token(&self, token: &str) -> ApiResult<Claims> {
        let claims = self.validate_token(token)?;

        if claims.token_type != ACCESS {
            return Err(ApiError::unauthorized("Expected access token"));
        }

        Ok(claims)
    }

    /// Validate that a token is a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> ApiResult<Claims> {
        let claims = self.validate_token(token)?;

        if claims.token_type != REFRESH {
            return Err(ApiError::unauthorized("Expected refresh token"));
        }

        Ok(claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Passwords
// =============================================================================

/// Hash a password for storage (argon2id, random salt).
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

// =============================================================================
// Extractor
// =============================================================================

/// An authenticated, active account and the principal it acts as.
///
/// Handlers that take this argument reject anonymous requests with 401.
/// Admin-only handlers additionally call
/// [`require_admin`](estilo_core::access::require_admin).
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub principal: Principal,
}

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization header"))?;

        let claims = state.jwt.validate_access_token(token)?;

        let user = state
            .db
            .users()
            .get_by_id(claims.user_id()?)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

        if !user.is_active {
            return Err(ApiError::unauthorized("Inactive user"));
        }

        let principal = Principal::from(&user);
        Ok(Authenticated { user, principal })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret".to_string(), 1800, 604800);

        let access_token = manager.generate_access_token(42).unwrap();
        let claims = manager.validate_access_token(&access_token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_refresh_token() {
        let manager = JwtManager::new("test-secret".to_string(), 1800, 604800);

        let refresh_token = manager.generate_refresh_token(42).unwrap();

        let claims = manager.validate_refresh_token(&refresh_token).unwrap();
        assert_eq!(claims.token_type, "refresh");
        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_wrong_token_type() {
        let manager = JwtManager::new("test-secret".to_string(), 1800, 604800);

        let access_token = manager.generate_access_token(42).unwrap();
        let refresh_token = manager.generate_refresh_token(42).unwrap();

        assert!(manager.validate_refresh_token(&access_token).is_err());
        assert!(manager.validate_access_token(&refresh_token).is_err());
    }

    #[test]
    fn test_foreign_secret_and_expired_tokens_are_rejected() {
        let ours = JwtManager::new("test-secret".to_string(), 1800, 604800);
        let theirs = JwtManager::new("other-secret".to_string(), 1800, 604800);
        let token = theirs.generate_access_token(1).unwrap();
        assert!(ours.validate_access_token(&token).is_err());

        // Past the default 60s leeway.
        let expired = JwtManager::new("test-secret".to_string(), -120, 604800);
        let token = expired.generate_access_token(1).unwrap();
        assert!(ours.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("s3cret-pass").unwrap();

        assert_ne!(hash, "s3cret-pass");
        assert!(verify_password("s3cret-pass", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret-pass", "not-a-hash"));
    }
}
