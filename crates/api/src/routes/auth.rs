//! Login, logout and session introspection.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AuthError, DomainError, Role, require_identity};
use serde::{Deserialize, Serialize};
use store::OrderStore;
use tower_sessions::Session;

use crate::error::ApiError;
use crate::session::{CURRENT_USER_KEY, SessionIdentity};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: Role,
}

/// POST /login: checks credentials and stores the identity in the session.
///
/// The session id is rotated on success. Bad credentials answer 401 with
/// `{"success": false}`.
#[tracing::instrument(skip(state, session, req), fields(user = %req.username))]
pub async fn login<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    session: Session,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    match state.auth.login(&req.username, &req.password).await {
        Ok(identity) => {
            session.cycle_id().await?;
            session.insert(CURRENT_USER_KEY, &identity).await?;

            metrics::counter!("logins_total").increment(1);
            tracing::info!(role = %identity.role, "login succeeded");

            Ok(Json(LoginResponse {
                success: true,
                role: Some(identity.role),
            })
            .into_response())
        }
        Err(DomainError::Auth(AuthError::InvalidCredentials)) => {
            metrics::counter!("login_failures_total").increment(1);
            tracing::warn!("login failed");

            Ok((
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse {
                    success: false,
                    role: None,
                }),
            )
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /logout: destroys the session.
pub async fn logout(session: Session) -> Result<Json<LogoutResponse>, ApiError> {
    session.flush().await?;
    Ok(Json(LogoutResponse { success: true }))
}

/// GET /me: the identity held by the session.
pub async fn me(identity: SessionIdentity) -> Result<Json<MeResponse>, ApiError> {
    let identity = require_identity(identity.identity()).map_err(DomainError::from)?;

    Ok(Json(MeResponse {
        username: identity.username.clone(),
        role: identity.role,
    }))
}
