//! # Order Planning
//!
//! The pure half of order creation: deciding, for one requested line and the
//! product row it points at, whether the line can be reserved and what gets
//! frozen into the order item.
//!
//! ## Where This Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderRepository::create (one SQLite transaction)                       │
//! │                                                                         │
//! │  for line in request order:                                            │
//! │       │                                                                 │
//! │       ├── SELECT product          ── missing ──► NotFound              │
//! │       │                                                                 │
//! │       ├── check_line() ← THIS MODULE                                   │
//! │       │        quantity > stock   ──────────► InsufficientStock        │
//! │       │                                                                 │
//! │       ├── UPDATE stock = stock - quantity  (guarded by stock >= qty)   │
//! │       └── INSERT order_item (price snapshot)                           │
//! │                                                                         │
//! │  COMMIT  (any error above drops the tx → full rollback)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Order, OrderLineRequest, Product};

/// A line that passed the stock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLine {
    pub product_id: i64,
    pub quantity: i64,
    /// Unit price frozen into the order item.
    pub price_cents: i64,
    /// Stock left on the product once this line is reserved.
    pub remaining_stock: i64,
}

impl PlannedLine {
    pub fn line_total(&self) -> Option<Money> {
        Money::from_cents(self.price_cents).checked_multiply_quantity(self.quantity)
    }
}

/// Checks one requested line against the product's current stock.
///
/// A quantity equal to the stock is accepted and empties the shelf.
pub fn check_line(product: &Product, line: &OrderLineRequest) -> CoreResult<PlannedLine> {
    debug_assert_eq!(product.id, line.product_id);

    if !product.has_stock_for(line.quantity) {
        return Err(insufficient_stock(product, line.quantity));
    }

    Ok(PlannedLine {
        product_id: product.id,
        quantity: line.quantity,
        price_cents: product.price_cents,
        remaining_stock: product.stock - line.quantity,
    })
}

/// InsufficientStock for `product` given its currently stored stock.
pub fn insufficient_stock(product: &Product, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        product_id: product.id,
        available: product.stock,
        requested,
    }
}

// =============================================================================
// Notification Text
// =============================================================================

/// Message sent to the client once an order is placed.
///
/// The total is left out when it does not fit in an `i64`.
pub fn confirmation_message(client_name: &str, order: &Order) -> String {
    let total = order
        .total()
        .map(|total| format!(", total {}", total))
        .unwrap_or_default();

    format!(
        "Hello {}, your order #{} was received with {} item(s){}. Status: {}.",
        client_name,
        order.id,
        order.unit_count(),
        total,
        order.status
    )
}

/// Message sent to the client when an order changes status.
pub fn status_change_message(client_name: &str, order: &Order) -> String {
    format!(
        "Hello {}, your order #{} is now: {}.",
        client_name, order.id, order.status
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
