//! Role-based visibility of orders.
//!
//! Every read of order lines on behalf of a caller goes through
//! [`visible_orders`], so the JSON listing and the spreadsheet export can
//! never disagree about who sees what.

use common::Role;
use serde::{Deserialize, Serialize};
use store::{OrderLine, OrderStore};

use crate::error::{AccessError, DomainError};

/// The authenticated caller, as held in server-side session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    /// Creates an identity.
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Returns true for the leader role.
    pub fn is_leader(&self) -> bool {
        self.role == Role::Leader
    }
}

/// Requires an active session.
pub fn require_identity(identity: Option<&Identity>) -> Result<&Identity, AccessError> {
    identity.ok_or(AccessError::Unauthorized)
}

/// Requires an active session with the leader role.
pub fn require_leader(identity: Option<&Identity>) -> Result<&Identity, AccessError> {
    let identity = require_identity(identity)?;
    if !identity.is_leader() {
        return Err(AccessError::Forbidden);
    }
    Ok(identity)
}

/// Returns the order lines `identity` may see, newest first.
///
/// Leaders see every line; members only their own.
#[tracing::instrument(skip(store, identity), fields(user = identity.map(|i| i.username.as_str())))]
pub async fn visible_orders<S: OrderStore + ?Sized>(
    store: &S,
    identity: Option<&Identity>,
) -> Result<Vec<OrderLine>, DomainError> {
    let identity = require_identity(identity)?;

    let lines = match identity.role {
        Role::Leader => store.list_all().await?,
        Role::Member => store.list_by(&identity.username).await?,
    };

    Ok(lines)
}
