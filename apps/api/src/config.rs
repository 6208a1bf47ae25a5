//! API configuration module.
//!
//! Configuration is loaded once at start-up and shared read-only through
//! [`AppState`](crate::AppState).
//!
//! ## Sources (later wins)
//! ```text
//! ApiConfig::default()  →  estilo.toml (optional)  →  ESTILO_* environment
//! ```
//! `.env` is read into the environment first, so `ESTILO_JWT_SECRET=...` in
//! a `.env` file behaves like an exported variable.

use serde::{Deserialize, Serialize};

/// Base name of the optional configuration file (`estilo.toml`).
pub const CONFIG_FILE: &str = "estilo";

/// Prefix of the environment variables read by [`ApiConfig::load`].
pub const ENV_PREFIX: &str = "ESTILO";

/// Development-only signing secret. `main` warns when it is still in use.
pub const DEV_JWT_SECRET: &str = "estilo-dev-secret-change-in-production";

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Interface to bind
    pub bind_addr: String,

    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Maximum pooled SQLite connections
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds
    pub jwt_refresh_lifetime_secs: i64,

    /// Initial administrator, created at start-up when no admin exists
    pub admin_email: Option<String>,
    pub admin_username: String,
    pub admin_password: Option<String>,

    /// WhatsApp gateway credentials. Without both, notifications are only logged.
    pub whatsapp_instance_id: Option<String>,
    pub whatsapp_token: Option<String>,
    pub whatsapp_api_base: String,

    /// Timeout for one outbound notification request
    pub notification_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            http_port: 8000,
            database_path: "./data/estilo.db".to_string(),
            db_max_connections: 5,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_access_lifetime_secs: 1800,    // 30 minutes
            jwt_refresh_lifetime_secs: 604800, // 7 days
            admin_email: None,
            admin_username: "admin".to_string(),
            admin_password: None,
            whatsapp_instance_id: None,
            whatsapp_token: None,
            whatsapp_api_base: "https://api.ultramsg.com".to_string(),
            notification_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    /// Load configuration from defaults, `estilo.toml` and `ESTILO_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&ApiConfig::default())?)
            .add_source(::config::File::with_name(CONFIG_FILE).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ApiConfig = settings.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }

        if self.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_access_lifetime_secs".to_string()));
        }

        if self.jwt_refresh_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("jwt_refresh_lifetime_secs".to_string()));
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("db_max_connections".to_string()));
        }

        if self.notification_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("notification_timeout_secs".to_string()));
        }

        Ok(())
    }

    /// Both WhatsApp credentials are present and non-blank.
    pub fn whatsapp_enabled(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.whatsapp_instance_id) && set(&self.whatsapp_token)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}
