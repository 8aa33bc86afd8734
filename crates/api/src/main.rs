//! API server entry point.

use std::sync::Arc;

use api::config::{Config, LogFormat};
use api::session::create_session_layer;
use api::{Backends, create_app, create_default_state};
use axum::Router;
use notifications::{LogNotifier, OrderNotifier, WebhookNotifier};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use store::{PostgresCatalog, PostgresOrderStore, PostgresUserStore};
use tokio::net::TcpListener;
use tokio::signal;
use tower_sessions::MemoryStore;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MAX_DB_CONNECTIONS: u32 = 10;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_notifier(config: &Config) -> Result<Arc<dyn OrderNotifier>, BoxError> {
    match &config.webhook_url {
        Some(url) => {
            tracing::info!("order notifications go to the configured webhook");
            Ok(Arc::new(WebhookNotifier::new(
                url.clone(),
                config.display_offset,
            )?))
        }
        None => {
            tracing::info!("WEBHOOK_URL not set, order notifications are only logged");
            Ok(Arc::new(LogNotifier::new(config.display_offset)))
        }
    }
}

async fn postgres_app(
    config: &Config,
    database_url: &SecretString,
    notifier: Arc<dyn OrderNotifier>,
    metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Result<Router, BoxError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_DB_CONNECTIONS)
        .connect(database_url.expose_secret())
        .await?;
    store::run_migrations(&pool).await?;

    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;

    let backends = Backends {
        orders: PostgresOrderStore::new(pool.clone()),
        catalog: Arc::new(PostgresCatalog::new(pool.clone())),
        users: Arc::new(PostgresUserStore::new(pool)),
        notifier,
    };
    let state = create_default_state(
        backends,
        config.display_offset,
        config.seed_password.expose_secret(),
    )
    .await?;

    tracing::info!("using PostgreSQL stores");
    Ok(create_app(
        state,
        metrics_handle,
        create_session_layer(session_store, config.session_secure),
    ))
}

async fn in_memory_app(
    config: &Config,
    notifier: Arc<dyn OrderNotifier>,
    metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Result<Router, BoxError> {
    let state = create_default_state(
        Backends::in_memory(notifier),
        config.display_offset,
        config.seed_password.expose_secret(),
    )
    .await?;

    tracing::warn!("DATABASE_URL not set, orders are kept in memory only");
    Ok(create_app(
        state,
        metrics_handle,
        create_session_layer(MemoryStore::default(), config.session_secure),
    ))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // 1. Load .env and configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // 2. Initialize tracing
    init_tracing(&config);

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 4. Build stores, state and router
    if config.uses_default_seed_password() {
        tracing::warn!("SEED_PASSWORD not set, seeded accounts use the default password");
    }
    let notifier = build_notifier(&config)?;
    let app = match &config.database_url {
        Some(url) => postgres_app(&config, url, notifier, metrics_handle).await?,
        None => in_memory_app(&config, notifier, metrics_handle).await?,
    };

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
