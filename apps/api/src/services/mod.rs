//! Service layer.
//!
//! Business orchestration that sits between the HTTP handlers and the
//! database crate.

pub mod bootstrap;
pub mod notification_service;
pub mod order_service;
