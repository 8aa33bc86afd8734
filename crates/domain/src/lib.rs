//! Domain layer for the order desk.
//!
//! This crate provides:
//! - [`OrderService`] for validating carts and recording submissions
//! - the [`access`] rules deciding who sees which orders
//! - [`AuthService`] for password login and user seeding
//! - [`CatalogService`] for listing and extending the catalog

pub mod access;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod service;

pub use access::{Identity, require_identity, require_leader, visible_orders};
pub use auth::{AuthService, SEED_USERS};
pub use cart::{CartEntry, parse_quantity};
pub use catalog::CatalogService;
pub use common::{Money, Role, SubmissionId};
pub use error::{AccessError, AuthError, DomainError, OrderError};
pub use service::{OrderService, PlacedOrder};
