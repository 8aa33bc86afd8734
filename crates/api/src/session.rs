//! Cookie sessions and the identity extractor.
//!
//! The caller's identity lives only in server-side session state; nothing in
//! a request body or query string can change it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use domain::Identity;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};

use crate::error::ApiError;

/// Session key holding the logged-in [`Identity`].
pub const CURRENT_USER_KEY: &str = "current_user";

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "order_desk_session";

const SESSION_IDLE_HOURS: i64 = 12;

/// Creates the session layer over `store`.
pub fn create_session_layer<St: SessionStore>(store: St, secure: bool) -> SessionManagerLayer<St> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_IDLE_HOURS)))
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Extractor yielding the session identity, if any.
///
/// A missing identity is not a rejection: handlers pass the option on to
/// the domain layer, which decides between 401 and 403. A session backend
/// that fails to load rejects with a 500.
pub struct SessionIdentity(pub Option<Identity>);

impl SessionIdentity {
    /// Borrows the identity.
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for SessionIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self(None));
        };

        let identity = session.get::<Identity>(CURRENT_USER_KEY).await?;
        Ok(Self(identity))
    }
}
