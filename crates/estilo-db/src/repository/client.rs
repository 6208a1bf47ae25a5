//! # Client Repository
//!
//! The client directory. Email and cpf are unique; both are checked before
//! every write (ignoring the row being updated) and the UNIQUE indexes catch
//! anything that races past the check.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::ensure_unique;
use crate::error::{DbError, DbResult};
use estilo_core::{Client, ClientUpdate, NewClient};

/// Repository for client database operations.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ClientRepository { pool }
    }

    /// Lists clients ordered by id.
    ///
    /// `name` and `email` are case-insensitive substring filters.
    pub async fn list(
        &self,
        skip: i64,
        limit: i64,
        name: Option<&str>,
        email: Option<&str>,
    ) -> DbResult<Vec<Client>> {
        debug!(skip, limit, name = ?name, email = ?email, "Listing clients");

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, cpf, phone, created_at, updated_at
            FROM clients
            WHERE (?1 IS NULL OR name LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR email LIKE '%' || ?2 || '%')
            ORDER BY id
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, cpf, phone, created_at, updated_at
            FROM clients
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, cpf, phone, created_at, updated_at
            FROM clients
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn get_by_cpf(&self, cpf: &str) -> DbResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, email, cpf, phone, created_at, updated_at
            FROM clients
            WHERE cpf = ?1
            "#,
        )
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    /// Inserts a new client.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email or cpf already registered
    pub async fn insert(&self, client: &NewClient) -> DbResult<Client> {
        let email = client.email.trim();
        debug!(email = %email, "Inserting client");

        ensure_unique(&self.pool, "clients", "email", email, None).await?;
        ensure_unique(&self.pool, "clients", "cpf", &client.cpf, None).await?;

        let now = Utc::now();

        let stored = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, cpf, phone, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id, name, email, cpf, phone, created_at, updated_at
            "#,
        )
        .bind(client.name.trim())
        .bind(email)
        .bind(&client.cpf)
        .bind(client.phone.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = stored.id, "Client inserted");
        Ok(stored)
    }

    /// Applies a partial update.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Client doesn't exist
    /// * `Err(DbError::UniqueViolation)` - New email or cpf belongs to another client
    pub async fn update(&self, id: i64, update: &ClientUpdate) -> DbResult<Client> {
        debug!(id, "Updating client");

        let current = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Client", id))?;

        let name = update.name.as_deref().map(str::trim).unwrap_or(current.name.as_str());
        let email = update.email.as_deref().map(str::trim).unwrap_or(current.email.as_str());
        let cpf = update.cpf.as_deref().unwrap_or(current.cpf.as_str());
        let phone = update.phone.as_deref().or(current.phone.as_deref());

        if email != current.email {
            ensure_unique(&self.pool, "clients", "email", email, Some(id)).await?;
        }
        if cpf != current.cpf {
            ensure_unique(&self.pool, "clients", "cpf", cpf, Some(id)).await?;
        }

        let updated = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name = ?2,
                email = ?3,
                cpf = ?4,
                phone = ?5,
                updated_at = ?6
            WHERE id = ?1
            RETURNING id, name, email, cpf, phone, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(cpf)
        .bind(phone)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Client", id))
    }

    /// Deletes a client.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Client doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Client still owns orders
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting client");

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Client", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
