//! # Error Types
//!
//! Domain-specific error types for estilo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  estilo-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule and authorization failures       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  estilo-db errors                                                      │
//! │  └── DbError          - Storage failures, conflicts, wraps CoreError   │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError         - HTTP status + JSON body                        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are retried internally; they go straight back to the caller.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    ///
    /// ## When This Occurs
    /// - Order line points at a product id that is not in the catalog
    /// - Admin creates an order for a client id that does not exist
    /// - Reading, updating or deleting an order that is gone
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Requested quantity exceeds what is on the shelf.
    ///
    /// ## User Workflow
    /// ```text
    /// POST /orders  items=[{product_id: 10, quantity: 2}]
    ///      │
    ///      ▼
    /// Product 10: stock=1
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 10, available: 1, requested: 2 }
    ///      │
    ///      ▼
    /// Whole order rolled back, stock stays 1
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        available: i64,
        requested: i64,
    },

    /// A request is missing a field needed to scope the action.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The principal lacks the capability for the action.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CoreError::NotFound { entity, id }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g. malformed email or cpf).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An order needs at least one line.
    #[error("order must contain at least one item")]
    EmptyOrder,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
