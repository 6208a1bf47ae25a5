//! # estilo-core: Pure Business Logic for the Lu Estilo back-office
//!
//! Every rule the back-office enforces that does not need a database or a
//! network lives here: entity types, money arithmetic, input validation, the
//! stock check behind order creation and the access-control gate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Back-Office Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │   /auth  /clients  /products  /orders  ──►  OrderService       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ estilo-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌────────┐ ┌───────┐ │   │
//! │  │   │  types  │  │  money  │  │validation│  │ access │ │ order │ │   │
//! │  │   │ Product │  │  Money  │  │  email   │  │  gate  │ │ stock │ │   │
//! │  │   │  Order  │  │ (cents) │  │   cpf    │  │ scope  │ │ check │ │   │
//! │  │   └─────────┘  └─────────┘  └──────────┘  └────────┘ └───────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    estilo-db (Database Layer)                   │   │
//! │  │           SQLite queries, migrations, order transaction         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Client, Order, User, Principal)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//! - [`access`] - Authorization predicates over a resolved [`Principal`]
//! - [`order`] - Per-line stock check and price snapshot
//!
//! ## Example Usage
//!
//! ```rust
//! use estilo_core::money::Money;
//!
//! let price = Money::from_cents(9990);
//! assert_eq!(price.to_string(), "99.90");
//! assert_eq!(price.checked_multiply_quantity(2).map(|m| m.cents()), Some(19980));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod order;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Status every new order starts in.
///
/// Order status is an open set of labels ("Pendente", "Enviado", ...); only
/// the initial value is fixed.
pub const DEFAULT_ORDER_STATUS: &str = "Pendente";

/// Maximum length of an order status label.
pub const MAX_STATUS_LEN: usize = 50;

/// Page size used by list endpoints when the caller gives none.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound on a single page.
pub const MAX_PAGE_LIMIT: i64 = 100;
