//! Order placement and listing endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use domain::{CartEntry, DomainError, Money, SubmissionId, require_identity};
use reporting::Submission;
use serde::{Deserialize, Serialize};
use store::OrderStore;

use crate::error::ApiError;
use crate::session::SessionIdentity;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PlaceOrderRequest {
    /// A missing or `null` cart is treated as empty.
    pub cart: Option<Vec<CartEntry>>,
}

#[derive(Serialize)]
pub struct PlaceOrderResponse {
    pub success: bool,
    pub submission_id: SubmissionId,
    pub total: Money,
}

/// POST /order: records the cart as one submission.
///
/// Unit prices come from the catalog; any client-sent price is ignored.
/// The session is checked before the body is looked at.
#[tracing::instrument(skip(state, identity, body))]
pub async fn place<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: SessionIdentity,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Json<PlaceOrderResponse>, ApiError> {
    let identity = require_identity(identity.identity()).map_err(DomainError::from)?;
    let Json(req) = body?;

    let placed = state
        .orders
        .place_order(Some(identity), req.cart.unwrap_or_default())
        .await?;

    Ok(Json(PlaceOrderResponse {
        success: true,
        submission_id: placed.submission_id,
        total: placed.total,
    }))
}

/// GET /orders: submissions visible to the caller, newest first.
#[tracing::instrument(skip(state, identity))]
pub async fn list<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: SessionIdentity,
) -> Result<Json<Vec<Submission>>, ApiError> {
    let submissions = state.reports.submissions_for(identity.identity()).await?;
    Ok(Json(submissions))
}
