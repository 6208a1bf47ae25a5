//! # Product Repository
//!
//! Catalog storage.
//!
//! ## Key Operations
//! - Paged listing, optionally by section
//! - CRUD with barcode uniqueness
//! - Restocking (positive stock delta)
//!
//! Stock goes down only inside [`OrderRepository::create`]'s transaction;
//! nothing here decrements it.
//!
//! [`OrderRepository::create`]: crate::repository::order::OrderRepository::create

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::ensure_unique;
use crate::error::{DbError, DbResult};
use estilo_core::validation::validate_quantity;
use estilo_core::{CoreError, NewProduct, Product, ProductUpdate};

pub(crate) const SELECT_PRODUCT_BY_ID: &str = r#"
    SELECT id, description, price_cents, barcode, section, stock, available,
           expiration_date, image_url, created_at, updated_at
    FROM products
    WHERE id = ?1
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products ordered by id.
    ///
    /// ## Arguments
    /// * `skip` / `limit` - Page window (already normalized by the caller)
    /// * `section` - Only products in this section, when given
    pub async fn list(&self, skip: i64, limit: i64, section: Option<&str>) -> DbResult<Vec<Product>> {
        debug!(skip, limit, section = ?section, "Listing products");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, description, price_cents, barcode, section, stock, available,
                   expiration_date, image_url, created_at, updated_at
            FROM products
            WHERE (?1 IS NULL OR section = ?1)
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(section)
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(SELECT_PRODUCT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its barcode.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, description, price_cents, barcode, section, stock, available,
                   expiration_date, image_url, created_at, updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Stored product with its generated id
    /// * `Err(DbError::UniqueViolation)` - Barcode already exists
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(barcode = %product.barcode, "Inserting product");

        ensure_unique(&self.pool, "products", "barcode", product.barcode.trim(), None).await?;

        let now = Utc::now();

        let stored = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                description, price_cents, barcode, section, stock, available,
                expiration_date, image_url, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING id, description, price_cents, barcode, section, stock, available,
                      expiration_date, image_url, created_at, updated_at
            "#,
        )
        .bind(product.description.trim())
        .bind(product.price_cents)
        .bind(product.barcode.trim())
        .bind(product.section.trim())
        .bind(product.stock)
        .bind(product.available)
        .bind(product.expiration_date)
        .bind(product.image_url.as_deref())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = stored.id, "Product inserted");
        Ok(stored)
    }

    /// Replaces a product's catalog data. Stock is left untouched.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Barcode belongs to another product
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        debug!(id, "Updating product");

        if self.get_by_id(id).await?.is_none() {
            return Err(DbError::not_found("Product", id));
        }

        ensure_unique(&self.pool, "products", "barcode", update.barcode.trim(), Some(id)).await?;

        let now = Utc::now();

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                description = ?2,
                price_cents = ?3,
                barcode = ?4,
                section = ?5,
                available = ?6,
                expiration_date = ?7,
                image_url = ?8,
                updated_at = ?9
            WHERE id = ?1
            RETURNING id, description, price_cents, barcode, section, stock, available,
                      expiration_date, image_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.description.trim())
        .bind(update.price_cents)
        .bind(update.barcode.trim())
        .bind(update.section.trim())
        .bind(update.available)
        .bind(update.expiration_date)
        .bind(update.image_url.as_deref())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Adds `quantity` units to a product's stock.
    ///
    /// ## Delta Update
    /// ```text
    /// UPDATE products SET stock = stock + 5 WHERE id = ?
    /// ```
    /// A relative update never overwrites reservations that committed in
    /// between a read and this write.
    pub async fn restock(&self, id: i64, quantity: i64) -> DbResult<Product> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        debug!(id, quantity, "Restocking product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - Order items still reference it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
