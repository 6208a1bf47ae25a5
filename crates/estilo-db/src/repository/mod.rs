//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler / service                                                      │
//! │       │                                                                 │
//! │       │  db.orders().create(client_id, &lines)                         │
//! │       ▼                                                                 │
//! │  OrderRepository ── SQL ──► SQLite                                     │
//! │                                                                         │
//! │  Repositories are cheap handles over the shared pool; create one per   │
//! │  call via the `Database` accessors.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog CRUD and restocking
//! - [`ClientRepository`](client::ClientRepository) - Client directory
//! - [`OrderRepository`](order::OrderRepository) - Order workflow (transactional create)
//! - [`UserRepository`](user::UserRepository) - Authentication accounts

pub mod client;
pub mod order;
pub mod product;
pub mod user;

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Fails with `UniqueViolation` when another row of `table` already holds
/// `value` in `column`. `exclude_id` skips the row being updated.
pub(crate) async fn ensure_unique(
    pool: &SqlitePool,
    table: &'static str,
    column: &'static str,
    value: &str,
    exclude_id: Option<i64>,
) -> DbResult<()> {
    let sql = format!(
        "SELECT id FROM {table} WHERE {column} = ?1 AND (?2 IS NULL OR id <> ?2) LIMIT 1"
    );

    let existing: Option<i64> = sqlx::query_scalar(&sql)
        .bind(value)
        .bind(exclude_id)
        .fetch_optional(pool)
        .await?;

    match existing {
        Some(_) => Err(DbError::duplicate(column, value)),
        None => Ok(()),
    }
}

/// Fails with `NotFound` unless a row with `id` exists in `table`.
pub(crate) async fn ensure_exists(
    pool: &SqlitePool,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> DbResult<()> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ?1");

    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    found.map(|_| ()).ok_or_else(|| DbError::not_found(entity, id))
}

// =============================================================================
// Test Fixtures
// =============================================================================
