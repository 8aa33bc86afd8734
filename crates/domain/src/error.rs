//! Domain error types.

use store::StoreError;
use thiserror::Error;

/// Errors raised while validating or pricing a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The cart has no entries.
    #[error("Cart empty")]
    EmptyCart,

    /// A quantity is not a positive whole number.
    #[error("Invalid quantity for {item}: {value}")]
    InvalidQuantity { item: String, value: String },

    /// The catalog has no item with this name.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// A line or cart total does not fit the money type.
    #[error("Order total overflows for {item}")]
    AmountOverflow { item: String },

    /// A catalog item failed validation.
    #[error("Invalid item: {0}")]
    InvalidItem(String),
}

/// Errors raised by the access rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No active session.
    #[error("Unauthorized")]
    Unauthorized,

    /// The session role may not perform this operation.
    #[error("Access denied - leader only")]
    Forbidden,
}

/// Errors raised during authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown user or wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The password could not be hashed.
    #[error("Password hashing failed")]
    PasswordHash,
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in a store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The cart or item was rejected.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// The caller may not perform this operation.
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}
