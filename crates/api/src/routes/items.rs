//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use domain::{DomainError, Money, require_leader};
use serde::{Deserialize, Serialize};
use store::{Item, OrderStore};

use crate::error::ApiError;
use crate::session::SessionIdentity;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewItemRequest {
    pub name: String,
    pub price: i64,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub name: String,
    pub price: Money,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            name: item.name,
            price: item.price,
        }
    }
}

/// GET /items: every catalog item ordered by name.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = state.catalog.list_items().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// POST /items: adds a catalog item. Leader only.
#[tracing::instrument(skip(state, identity, body))]
pub async fn add<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: SessionIdentity,
    body: Result<Json<NewItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let leader = require_leader(identity.identity()).map_err(DomainError::from)?;
    let Json(req) = body?;

    let item = state
        .catalog
        .add_item(Some(leader), &req.name, req.price)
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}
