//! # Lu Estilo API
//!
//! REST server for the Lu Estilo back-office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Surface                                   │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /auth         │  │  /clients      │  │  /products                 ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • list (filter)│  │ • list (section)           ││
//! │  │ • login        │  │ • CRUD (admin) │  │ • CRUD (admin)             ││
//! │  │ • refresh-token│  │                │  │ • restock (admin)          ││
//! │  │ • me / users   │  │                │  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  /orders  ──►  OrderService                                      │  │
//! │  │                  access gate → transaction → notification        │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │  WhatsApp    │  │    JWT Auth              ││  │
//! │  │  │  (estilo-db) │  │  gateway     │  │    argon2 passwords      ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (prefix `ESTILO_`, also read from `.env` and
//! `estilo.toml`):
//! - `ESTILO_HTTP_PORT` - HTTP port (default: 8000)
//! - `ESTILO_DATABASE_PATH` - SQLite file (default: ./data/estilo.db)
//! - `ESTILO_JWT_SECRET` - Secret for JWT signing
//! - `ESTILO_JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 1800)
//! - `ESTILO_JWT_REFRESH_LIFETIME_SECS` - Refresh token lifetime (default: 604800)
//! - `ESTILO_ADMIN_EMAIL` / `ESTILO_ADMIN_PASSWORD` - Bootstrap administrator
//! - `ESTILO_WHATSAPP_INSTANCE_ID` / `ESTILO_WHATSAPP_TOKEN` - Notification gateway

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;
