//! Spreadsheet download.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use reporting::{EXPORT_FILENAME, XLSX_CONTENT_TYPE};
use store::OrderStore;

use crate::error::ApiError;
use crate::session::SessionIdentity;
use crate::state::AppState;

/// GET /export: every submission as an xlsx attachment. Leader only.
#[tracing::instrument(skip(state, identity))]
pub async fn download<S: OrderStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    identity: SessionIdentity,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.reports.export_for(identity.identity()).await?;
    let disposition = format!("attachment; filename={EXPORT_FILENAME}");

    Ok((
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
