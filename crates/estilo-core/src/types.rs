//! # Domain Types
//!
//! Core domain types used throughout the back-office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Client       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │◄──│  id             │       │
//! │  │  barcode (uniq) │   │  client_id (FK) │   │  email (uniq)   │       │
//! │  │  price_cents    │   │  status         │   │  cpf (uniq)     │       │
//! │  │  stock (>= 0)   │   │  items ───────┐ │   │  phone          │       │
//! │  └────────▲────────┘   └───────────────┼─┘   └────────▲────────┘       │
//! │           │                            │              │                 │
//! │           │            ┌───────────────▼─┐   ┌────────┴────────┐       │
//! │           └────────────│   OrderItem     │   │     User        │       │
//! │            product_id  │  quantity (> 0) │   │  is_admin       │       │
//! │                        │  price_cents    │   │  client_id?     │       │
//! │                        │  (snapshot)     │   │  → Principal    │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderItem.price_cents` is copied from the product when the order is
//! created and never re-read. Later catalog price changes leave historical
//! orders untouched.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_cpf, validate_email, validate_optional_len, validate_price_cents, validate_required,
    validate_stock, ValidationResult,
};

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub description: String,
    /// Current price in centavos.
    pub price_cents: i64,
    /// Unique across the catalog.
    pub barcode: String,
    /// Store section ("Feminino", "Acessórios", ...). Orders can be filtered by it.
    pub section: String,
    /// Units on hand. Never negative; decremented only by order creation.
    pub stock: i64,
    pub available: bool,
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the current price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether `quantity` units can be taken from stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

fn default_true() -> bool {
    true
}

/// Payload for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub description: String,
    pub price_cents: i64,
    pub barcode: String,
    pub section: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("description", &self.description, 255)?;
        validate_required("barcode", &self.barcode, 64)?;
        validate_required("section", &self.section, 100)?;
        validate_price_cents(self.price_cents)?;
        validate_stock(self.stock)?;
        validate_optional_len("image_url", self.image_url.as_deref(), 500)
    }
}

/// Full replacement of a product's catalog data.
///
/// Stock is deliberately absent: it only moves through order creation
/// (down) and restocking (up).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub description: String,
    pub price_cents: i64,
    pub barcode: String,
    pub section: String,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProductUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("description", &self.description, 255)?;
        validate_required("barcode", &self.barcode, 64)?;
        validate_required("section", &self.section, 100)?;
        validate_price_cents(self.price_cents)?;
        validate_optional_len("image_url", self.image_url.as_deref(), 500)
    }
}

// =============================================================================
// Client
// =============================================================================

/// A customer of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Client {
    pub id: i64,
    pub name: String,
    /// Unique.
    pub email: String,
    /// Brazilian taxpayer id, 11 digits. Unique.
    pub cpf: String,
    /// WhatsApp-capable number; order notifications go here.
    pub phone: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a client.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub cpf: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewClient {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("name", &self.name, 150)?;
        validate_email(&self.email)?;
        validate_cpf(&self.cpf)?;
        validate_optional_len("phone", self.phone.as_deref(), 20)
    }
}

/// Partial client update. Unset fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientUpdate {
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_required("name", name, 150)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(cpf) = &self.cpf {
            validate_cpf(cpf)?;
        }
        validate_optional_len("phone", self.phone.as_deref(), 20)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A client order with its items.
///
/// Items are loaded by an explicit second query in the storage layer; the
/// row mapping skips them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Open label set; starts as [`crate::DEFAULT_ORDER_STATUS`].
    pub status: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of the item snapshots, `None` if it does not fit in an `i64`.
    pub fn total(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.line_total()?))
    }

    /// Total units across all lines.
    pub fn unit_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.quantity))
    }
}

/// A line of an order. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price in centavos at the time the order was placed (frozen).
    pub price_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price().checked_multiply_quantity(self.quantity)
    }
}

/// One requested line of a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Conjunctive order filter. `None` leaves a dimension unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub client_id: Option<i64>,
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
    /// Matches orders with at least one item from a product in this section.
    pub section: Option<String>,
    pub status: Option<String>,
    pub order_id: Option<i64>,
}

// =============================================================================
// Users & Principals
// =============================================================================

/// An authentication account.
///
/// Not serialized; the API exposes a profile DTO without the password hash.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
    /// Client profile this account orders as, if any.
    pub client_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Data for a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_admin: bool,
    pub client_id: Option<i64>,
}

/// Partial account update.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
    pub is_admin: Option<bool>,
    /// `None` keeps the link, `Some(None)` unlinks, `Some(Some(id))` relinks.
    pub client_id: Option<Option<i64>>,
}

/// Capability levels the access gate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Any authenticated, active account. Scoped to its own client.
    Customer,
    /// Unrestricted; may act on behalf of any client.
    Admin,
}

/// The resolved acting identity of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub client_id: Option<i64>,
    pub is_admin: bool,
}

impl Principal {
    pub fn capability(&self) -> Capability {
        if self.is_admin {
            Capability::Admin
        } else {
            Capability::Customer
        }
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Principal {
            user_id: user.id,
            client_id: user.client_id,
            is_admin: user.is_admin,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, price_cents: i64) -> OrderItem {
        OrderItem {
            id: 1,
            order_id: 1,
            product_id: 10,
            quantity,
            price_cents,
        }
    }

    #[test]
    fn test_order_total_uses_snapshots() {
        let order = Order {
            id: 1,
            client_id: 7,
            status: "Pendente".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![item(2, 9990), item(1, 1500)],
        };

        assert_eq!(order.total().map(|t| t.cents()), Some(21480));
        assert_eq!(order.unit_count(), 3);
    }

    #[test]
    fn test_order_total_overflow_is_none() {
        let mut order = Order {
            id: 1,
            client_id: 7,
            status: "Pendente".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: vec![item(100_000_000, 1_000_000_000_000)],
        };
        assert_eq!(order.total(), None);

        // Each line fits, the sum does not.
        order.items = vec![item(1, i64::MAX), item(1, 1)];
        assert_eq!(order.total(), None);
    }

    #[test]
    fn test_new_product_defaults() {
        let json = r#"{"description":"Vestido","price_cents":9990,"barcode":"789","section":"Feminino"}"#;
        let product: NewProduct = serde_json::from_str(json).unwrap();

        assert_eq!(product.stock, 0);
        assert!(product.available);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_new_client_validation() {
        let client = NewClient {
            name: "Maria".to_string(),
            email: "maria@example.com".to_string(),
            cpf: "1234567890".to_string(),
            phone: None,
        };
        assert!(client.validate().is_err());

        let client = NewClient {
            cpf: "12345678901".to_string(),
            ..client
        };
        assert!(client.validate().is_ok());
    }

    #[test]
    fn test_principal_capability() {
        let principal = Principal {
            user_id: 1,
            client_id: None,
            is_admin: true,
        };
        assert_eq!(principal.capability(), Capability::Admin);
    }
}
