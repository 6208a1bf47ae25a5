//! Start-up tasks that seed required data.

use tracing::{info, warn};

use crate::auth::hash_password;
use crate::config::ApiConfig;
use crate::error::ApiResult;
use estilo_core::{NewUser, User, UserUpdate};
use estilo_db::Database;

/// Makes sure an administrator exists.
///
/// ## Behavior
/// - An active admin already exists: nothing happens
/// - `admin_email` + `admin_password` configured: that account is created,
///   or promoted and reactivated if the email is already registered
/// - Otherwise: a warning is logged and the server starts without one
pub async fn ensure_admin(db: &Database, config: &ApiConfig) -> ApiResult<Option<User>> {
    if db.users().count_admins().await? > 0 {
        return Ok(None);
    }

    let (email, password) = match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email.trim(), password)
        }
        _ => {
            warn!("No administrator account exists and ESTILO_ADMIN_EMAIL / ESTILO_ADMIN_PASSWORD are not set");
            return Ok(None);
        }
    };

    let hashed_password = hash_password(password)?;

    let admin = match db.users().get_by_email(email).await? {
        Some(existing) => {
            db.users()
                .update(
                    existing.id,
                    &UserUpdate {
                        hashed_password: Some(hashed_password),
                        is_active: Some(true),
                        is_admin: Some(true),
                        client_id: None,
                    },
                )
                .await?
        }
        None => {
            db.users()
                .insert(&NewUser {
                    username: config.admin_username.clone(),
                    email: email.to_string(),
                    hashed_password,
                    is_admin: true,
                    client_id: None,
                })
                .await?
        }
    };

    info!(user_id = admin.id, email = %admin.email, "Bootstrap administrator ready");
    Ok(Some(admin))
}
