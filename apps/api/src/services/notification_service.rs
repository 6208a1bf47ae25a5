//! Outbound client notifications.
//!
//! Delivery is best-effort and never part of the request that triggered it.
//!
//! ## Dispatch
//! ```text
//! OrderService ── dispatch(phone, message) ──► tokio::spawn ──► Notifier
//!      │                                                          │
//!      └── returns to the handler immediately          failure: warn! only
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;

/// Notification delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification gateway rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers one message to one contact.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, contact: &str, message: &str) -> Result<(), NotificationError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

// =============================================================================
// WhatsApp
// =============================================================================

/// Sends chat messages through an UltraMsg-style WhatsApp gateway.
///
/// `POST {api_base}/{instance_id}/messages/chat` with the form
/// `token`, `to`, `body`.
pub struct WhatsAppNotifier {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl WhatsAppNotifier {
    pub fn new(
        api_base: &str,
        instance_id: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(WhatsAppNotifier {
            client,
            endpoint: format!(
                "{}/{}/messages/chat",
                api_base.trim_end_matches('/'),
                instance_id
            ),
            token: token.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    async fn notify(&self, contact: &str, message: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("token", self.token.as_str()),
                ("to", contact),
                ("body", message),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to = %contact, "WhatsApp message accepted");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "whatsapp"
    }
}

/// Used when no gateway credentials are configured: the message is logged.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, contact: &str, message: &str) -> Result<(), NotificationError> {
        info!(to = %contact, %message, "Notification (no gateway configured)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Picks the notifier the configuration allows.
pub fn notifier_from_config(config: &ApiConfig) -> Result<Arc<dyn Notifier>, NotificationError> {
    match (&config.whatsapp_instance_id, &config.whatsapp_token) {
        (Some(instance_id), Some(token)) if config.whatsapp_enabled() => {
            let notifier = WhatsAppNotifier::new(
                &config.whatsapp_api_base,
                instance_id,
                token,
                Duration::from_secs(config.notification_timeout_secs),
            )?;
            info!(endpoint = %notifier.endpoint(), "WhatsApp notifications enabled");
            Ok(Arc::new(notifier))
        }
        _ => {
            info!("WhatsApp credentials not configured, notifications will be logged");
            Ok(Arc::new(LogNotifier))
        }
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Fire-and-forget front for a [`Notifier`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        NotificationDispatcher { notifier }
    }

    /// Sends in a background task. Errors are logged and dropped.
    pub fn dispatch(&self, contact: String, message: String) {
        let notifier = self.notifier.clone();

        tokio::spawn(async move {
            match notifier.notify(&contact, &message).await {
                Ok(()) => debug!(notifier = notifier.name(), to = %contact, "Notification sent"),
                Err(e) => warn!(
                    notifier = notifier.name(),
                    to = %contact,
                    error = %e,
                    "Notification failed"
                ),
            }
        });
    }
}

// =============================================================================
// Test Notifiers
// =============================================================================
