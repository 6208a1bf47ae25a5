//! # Validation Module
//!
//! Input validation for API payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (serde)                                       │
//! │  └── Shape and types of the JSON body                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, email / cpf format                      │
//! │  └── Positive quantities, non-negative prices and stock                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── UNIQUE (email, cpf, barcode)                                      │
//! │  ├── CHECK (stock >= 0, quantity > 0)                                  │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::OrderLineRequest;
use crate::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, MAX_STATUS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field: non-blank after trimming and at most
/// `max_len` characters.
pub fn validate_required(field: &str, value: &str, max_len: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max_len {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: max_len,
        });
    }

    Ok(())
}

/// Length check for optional text fields. `None` always passes.
pub fn validate_optional_len(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(ValidationError::TooLong {
            field: field.to_string(),
            max: max_len,
        }),
        _ => Ok(()),
    }
}

/// Validates an email address.
///
/// ## Rules
/// - Exactly one `@`
/// - Non-empty local part
/// - Domain contains a dot that is neither first nor last
/// - No whitespace
///
/// ## Example
/// ```rust
/// use estilo_core::validation::validate_email;
///
/// assert!(validate_email("maria@example.com").is_ok());
/// assert!(validate_email("maria.example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(invalid("must contain exactly one '@'")),
    };

    if local.is_empty() {
        return Err(invalid("missing local part"));
    }

    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid("domain must contain a dot"));
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    Ok(())
}

/// Validates a CPF: exactly 11 ASCII digits, no punctuation.
///
/// ```rust
/// use estilo_core::validation::validate_cpf;
///
/// assert!(validate_cpf("12345678901").is_ok());
/// assert!(validate_cpf("123.456.789-01").is_err());
/// ```
pub fn validate_cpf(cpf: &str) -> ValidationResult<()> {
    if cpf.len() != 11 || !cpf.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cpf".to_string(),
            reason: "must be exactly 11 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an order status label.
pub fn validate_status(status: &str) -> ValidationResult<()> {
    validate_required("status", status, MAX_STATUS_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in centavos. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price_cents".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Clamps pagination parameters.
///
/// `skip` defaults to 0 and never goes negative; `limit` defaults to
/// [`DEFAULT_PAGE_LIMIT`] and is clamped to `1..=MAX_PAGE_LIMIT`.
pub fn normalize_page(skip: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
    (skip, limit)
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the lines of a new order: at least one, every quantity positive.
///
/// Product existence and stock are checked later, inside the transaction.
pub fn validate_order_lines(lines: &[OrderLineRequest]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }

    lines
        .iter()
        .try_for_each(|line| validate_quantity(line.quantity))
}

// =============================================================================
// Unit Tests
// =============================================================================
