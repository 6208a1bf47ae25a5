//! # Access Control Gate
//!
//! Authorization predicates over an already-resolved [`Principal`].
//!
//! Resolving the principal (token → account → active check) is the API
//! layer's job. Everything here is a plain function so handlers call the
//! guard they need explicitly.
//!
//! ## Rules
//! ```text
//! ┌──────────────────┬────────────────────────────┬──────────────────────────┐
//! │ Action           │ Admin                      │ Customer                 │
//! ├──────────────────┼────────────────────────────┼──────────────────────────┤
//! │ create order     │ must name client_id        │ always own client        │
//! │                  │ (else BadRequest)          │ (none linked: BadRequest)│
//! │ read one order   │ any                        │ own only (else Forbidden)│
//! │ list orders      │ filters as given           │ client_id forced to own  │
//! │ update / delete  │ allowed                    │ Forbidden                │
//! └──────────────────┴────────────────────────────┴──────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Capability, Order, OrderFilter, Principal};

/// Passes the principal through when it holds `required`.
pub fn require_capability(principal: &Principal, required: Capability) -> CoreResult<&Principal> {
    match (required, principal.capability()) {
        (Capability::Customer, _) | (Capability::Admin, Capability::Admin) => Ok(principal),
        (Capability::Admin, Capability::Customer) => Err(CoreError::Forbidden(
            "administrator privileges required".to_string(),
        )),
    }
}

/// Shorthand for `require_capability(principal, Capability::Admin)`.
pub fn require_admin(principal: &Principal) -> CoreResult<&Principal> {
    require_capability(principal, Capability::Admin)
}

/// Decides which client a new order belongs to.
///
/// A customer's own link wins; any `requested` value they send is ignored.
pub fn resolve_order_owner(principal: &Principal, requested: Option<i64>) -> CoreResult<i64> {
    if principal.is_admin {
        return requested.ok_or_else(|| {
            CoreError::BadRequest("client_id is required when ordering as an administrator".to_string())
        });
    }

    principal.client_id.ok_or_else(|| {
        CoreError::BadRequest("account is not linked to a client profile".to_string())
    })
}

/// Fails with Forbidden unless the principal may see `order`.
pub fn authorize_order_read(principal: &Principal, order: &Order) -> CoreResult<()> {
    if principal.is_admin || principal.client_id == Some(order.client_id) {
        return Ok(());
    }

    Err(CoreError::Forbidden(format!(
        "order {} belongs to another client",
        order.id
    )))
}

/// Narrows a list filter to what the principal may see.
///
/// Returns `None` when the principal can see no orders at all (a customer
/// account without a client profile).
pub fn scope_order_filter(principal: &Principal, mut filter: OrderFilter) -> Option<OrderFilter> {
    if principal.is_admin {
        return Some(filter);
    }

    let own = principal.client_id?;
    filter.client_id = Some(own);
    Some(filter)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const ADMIN: Principal = Principal {
        user_id: 1,
        client_id: None,
        is_admin: true,
    };

    const CUSTOMER: Principal = Principal {
        user_id: 2,
        client_id: Some(7),
        is_admin: false,
    };

    const UNLINKED: Principal = Principal {
        user_id: 3,
        client_id: None,
        is_admin: false,
    };

    fn order_for(client_id: i64) -> Order {
        Order {
            id: 5,
            client_id,
            status: "Pendente".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            items: Vec::new(),
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(&ADMIN).is_ok());
        assert!(matches!(require_admin(&CUSTOMER), Err(CoreError::Forbidden(_))));
        assert!(require_capability(&CUSTOMER, Capability::Customer).is_ok());
    }

    #[test]
    fn test_resolve_order_owner_admin() {
        assert_eq!(resolve_order_owner(&ADMIN, Some(7)).unwrap(), 7);
        assert!(matches!(
            resolve_order_owner(&ADMIN, None),
            Err(CoreError::BadRequest(_))
        ));
    }

    #[test]
    fn test_resolve_order_owner_customer_ignores_request() {
        assert_eq!(resolve_order_owner(&CUSTOMER, None).unwrap(), 7);
        assert_eq!(resolve_order_owner(&CUSTOMER, Some(99)).unwrap(), 7);
        assert!(matches!(
            resolve_order_owner(&UNLINKED, Some(7)),
            Err(CoreError::BadRequest(_))
        ));
    }

    #[test]
    fn test_authorize_order_read() {
        assert!(authorize_order_read(&ADMIN, &order_for(99)).is_ok());
        assert!(authorize_order_read(&CUSTOMER, &order_for(7)).is_ok());
        assert!(matches!(
            authorize_order_read(&CUSTOMER, &order_for(8)),
            Err(CoreError::Forbidden(_))
        ));
        assert!(authorize_order_read(&UNLINKED, &order_for(7)).is_err());
    }

    #[test]
    fn test_scope_order_filter() {
        let requested = OrderFilter {
            client_id: Some(8),
            status: Some("Enviado".to_string()),
            ..OrderFilter::default()
        };

        let admin_view = scope_order_filter(&ADMIN, requested.clone()).unwrap();
        assert_eq!(admin_view, requested);

        let customer_view = scope_order_filter(&CUSTOMER, requested.clone()).unwrap();
        assert_eq!(customer_view.client_id, Some(7));
        assert_eq!(customer_view.status.as_deref(), Some("Enviado"));

        assert!(scope_order_filter(&UNLINKED, requested).is_none());
    }
}
