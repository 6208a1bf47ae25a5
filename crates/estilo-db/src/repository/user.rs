//! # User Repository
//!
//! Authentication accounts. Passwords arrive already hashed; this layer
//! never sees plaintext.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{ensure_exists, ensure_unique};
use crate::error::{DbError, DbResult};
use estilo_core::{NewUser, User, UserUpdate};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, is_active, is_admin,
                   client_id, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Looks an account up by its login email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, hashed_password, is_active, is_admin,
                   client_id, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new, active account.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    /// * `Err(DbError::NotFound)` - `client_id` points at no client
    pub async fn insert(&self, user: &NewUser) -> DbResult<User> {
        let email = user.email.trim();
        debug!(email = %email, is_admin = user.is_admin, "Inserting user");

        ensure_unique(&self.pool, "users", "email", email, None).await?;
        if let Some(client_id) = user.client_id {
            ensure_exists(&self.pool, "clients", "Client", client_id).await?;
        }

        let stored = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, hashed_password, is_active, is_admin, client_id, created_at)
            VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6)
            RETURNING id, username, email, hashed_password, is_active, is_admin,
                      client_id, created_at
            "#,
        )
        .bind(user.username.trim())
        .bind(email)
        .bind(&user.hashed_password)
        .bind(user.is_admin)
        .bind(user.client_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        debug!(id = stored.id, "User inserted");
        Ok(stored)
    }

    /// Applies a partial update. Unset fields keep their stored value.
    pub async fn update(&self, id: i64, update: &UserUpdate) -> DbResult<User> {
        debug!(id, "Updating user");

        if let Some(Some(client_id)) = update.client_id {
            ensure_exists(&self.pool, "clients", "Client", client_id).await?;
        }

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                hashed_password = COALESCE(?2, hashed_password),
                is_active = COALESCE(?3, is_active),
                is_admin = COALESCE(?4, is_admin),
                client_id = CASE WHEN ?5 THEN ?6 ELSE client_id END
            WHERE id = ?1
            RETURNING id, username, email, hashed_password, is_active, is_admin,
                      client_id, created_at
            "#,
        )
        .bind(id)
        .bind(update.hashed_password.as_deref())
        .bind(update.is_active)
        .bind(update.is_admin)
        .bind(update.client_id.is_some())
        .bind(update.client_id.flatten())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("User", id))
    }

    /// Number of active administrator accounts.
    pub async fn count_admins(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_admin = 1 AND is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures;

    fn new_user(email: &str, client_id: Option<i64>) -> NewUser {
        NewUser {
            username: "maria".to_string(),
            email: email.to_string(),
            hashed_password: "$argon2id$stub".to_string(),
            is_admin: false,
            client_id,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = fixtures::db().await;
        let client = fixtures::client(&db).await;

        let user = db
            .users()
            .insert(&new_user("maria@example.com", Some(client.id)))
            .await
            .unwrap();

        assert!(user.is_active);
        assert!(!user.is_admin);
        assert_eq!(user.client_id, Some(client.id));

        let by_email = db.users().get_by_email("maria@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert!(db.users().get_by_id(user.id).await.unwrap().is_some());
        assert!(db.users().get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email_and_unknown_client() {
        let db = fixtures::db().await;
        db.users().insert(&new_user("maria@example.com", None)).await.unwrap();

        assert!(matches!(
            db.users().insert(&new_user("maria@example.com", None)).await,
            Err(DbError::UniqueViolation { .. })
        ));
        assert!(matches!(
            db.users().insert(&new_user("other@example.com", Some(77))).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_partial_update_and_admin_count() {
        let db = fixtures::db().await;
        let user = db.users().insert(&new_user("maria@example.com", None)).await.unwrap();
        assert_eq!(db.users().count_admins().await.unwrap(), 0);

        let promoted = db
            .users()
            .update(
                user.id,
                &UserUpdate {
                    is_admin: Some(true),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(promoted.is_admin);
        assert!(promoted.is_active);
        assert_eq!(promoted.hashed_password, user.hashed_password);
        assert_eq!(db.users().count_admins().await.unwrap(), 1);

        let deactivated = db
            .users()
            .update(
                user.id,
                &UserUpdate {
                    is_active: Some(false),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert!(!deactivated.is_active);
        assert!(deactivated.is_admin);
        assert_eq!(db.users().count_admins().await.unwrap(), 0);

        assert!(matches!(
            db.users().update(999, &UserUpdate::default()).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_client_link_kept_replaced_and_cleared() {
        let db = fixtures::db().await;
        let maria = fixtures::client(&db).await;
        let joao = db
            .clients()
            .insert(&fixtures::new_client("joao@example.com", "10987654321"))
            .await
            .unwrap();
        let user = db
            .users()
            .insert(&new_user("maria@example.com", Some(maria.id)))
            .await
            .unwrap();

        let kept = db
            .users()
            .update(
                user.id,
                &UserUpdate {
                    is_admin: Some(false),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.client_id, Some(maria.id));

        let relinked = db
            .users()
            .update(
                user.id,
                &UserUpdate {
                    client_id: Some(Some(joao.id)),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(relinked.client_id, Some(joao.id));

        let unlinked = db
            .users()
            .update(
                user.id,
                &UserUpdate {
                    client_id: Some(None),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unlinked.client_id, None);

        assert!(matches!(
            db.users()
                .update(
                    user.id,
                    &UserUpdate {
                        client_id: Some(Some(999)),
                        ..UserUpdate::default()
                    },
                )
                .await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_deleting_client_unlinks_account() {
        let db = fixtures::db().await;
        let client = fixtures::client(&db).await;
        let user = db
            .users()
            .insert(&new_user("maria@example.com", Some(client.id)))
            .await
            .unwrap();

        db.clients().delete(client.id).await.unwrap();

        let reloaded = db.users().get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.client_id, None);
    }
}
