//! Shared application state.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::services::notification_service::{NotificationDispatcher, Notifier};
use crate::services::order_service::OrderService;
use estilo_db::Database;

/// Shared application state, handed to every handler as `State<Arc<AppState>>`.
///
/// Built once at start-up; nothing in it is mutated afterwards.
pub struct AppState {
    pub db: Database,
    pub config: Arc<ApiConfig>,
    pub jwt: JwtManager,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let jwt = JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_access_lifetime_secs,
            config.jwt_refresh_lifetime_secs,
        );

        let orders = OrderService::new(db.clone(), NotificationDispatcher::new(notifier));

        Arc::new(AppState {
            db,
            config: Arc::new(config),
            jwt,
            orders,
        })
    }
}
