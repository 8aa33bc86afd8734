//! HTTP API server for the order desk.
//!
//! Provides the login, catalog, order and export endpoints over cookie
//! sessions, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use store::OrderStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

pub use state::{AppState, Backends, create_default_state};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, St>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
    session_layer: SessionManagerLayer<St>,
) -> Router
where
    S: OrderStore + Clone + 'static,
    St: SessionStore + Clone,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/login", axum::routing::post(routes::auth::login::<S>))
        .route("/logout", get(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .route(
            "/items",
            get(routes::items::list::<S>).post(routes::items::add::<S>),
        )
        .route("/order", axum::routing::post(routes::orders::place::<S>))
        .route("/orders", get(routes::orders::list::<S>))
        .route("/export", get(routes::export::download::<S>))
        .with_state(state)
        .layer(session_layer)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
