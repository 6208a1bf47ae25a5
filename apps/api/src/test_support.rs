//! In-process harness for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use crate::auth::hash_password;
use crate::config::ApiConfig;
use crate::routes::router;
use crate::services::notification_service::testing::RecordingNotifier;
use crate::state::AppState;
use estilo_core::{Client, NewClient, NewProduct, NewUser, Product, User};
use estilo_db::{Database, DbConfig};

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub notifications: mpsc::UnboundedReceiver<(String, String)>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = ApiConfig {
            jwt_secret: "test-secret".to_string(),
            ..ApiConfig::default()
        };
        let (notifier, notifications) = RecordingNotifier::new();

        let state = AppState::new(db, config, Arc::new(notifier));
        let router = router(state.clone());

        TestApp {
            state,
            router,
            notifications,
        }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Inserts an account without hashing a real password.
    pub async fn user(&self, email: &str, is_admin: bool, client_id: Option<i64>) -> User {
        self.db()
            .users()
            .insert(&NewUser {
                username: email.split('@').next().unwrap_or(email).to_string(),
                email: email.to_string(),
                hashed_password: "not-a-real-hash".to_string(),
                is_admin,
                client_id,
            })
            .await
            .unwrap()
    }

    /// Inserts an account whose password is `password`.
    pub async fn user_with_password(&self, email: &str, password: &str) -> User {
        self.db()
            .users()
            .insert(&NewUser {
                username: "maria".to_string(),
                email: email.to_string(),
                hashed_password: hash_password(password).unwrap(),
                is_admin: false,
                client_id: None,
            })
            .await
            .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        self.state.jwt.generate_access_token(user.id).unwrap()
    }

    pub async fn admin_token(&self) -> String {
        let admin = self.user("admin@luestilo.com", true, None).await;
        self.token_for(&admin)
    }

    pub async fn client(&self, email: &str, cpf: &str) -> Client {
        self.db()
            .clients()
            .insert(&NewClient {
                name: "Maria".to_string(),
                email: email.to_string(),
                cpf: cpf.to_string(),
                phone: Some("5511999990000".to_string()),
            })
            .await
            .unwrap()
    }

    pub async fn product(&self, barcode: &str, price_cents: i64, stock: i64) -> Product {
        self.db()
            .products()
            .insert(&NewProduct {
                description: format!("Produto {barcode}"),
                price_cents,
                barcode: barcode.to_string(),
                section: "Feminino".to_string(),
                stock,
                available: true,
                expiration_date: None,
                image_url: None,
            })
            .await
            .unwrap()
    }

    /// Creates a client and a customer account linked to it.
    pub async fn customer(&self, email: &str, cpf: &str) -> (Client, String) {
        let client = self.client(email, cpf).await;
        let user = self.user(email, false, Some(client.id)).await;
        (client, self.token_for(&user))
    }
}

/// Builds a request, with a JSON body and bearer token when given.
pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Runs one request through the router. Non-JSON bodies come back as `Value::Null`.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}
