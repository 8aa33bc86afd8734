//! Shared application state and its wiring.

use std::sync::Arc;

use chrono::FixedOffset;
use domain::{AuthService, CatalogService, DomainError, OrderService};
use notifications::OrderNotifier;
use reporting::{Aggregator, ReportService};
use store::{Catalog, InMemoryCatalog, InMemoryOrderStore, InMemoryUserStore, OrderStore, UserStore};

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub orders: OrderService<S>,
    pub reports: ReportService<S>,
    pub catalog: CatalogService,
    pub auth: AuthService,
}

/// Storage and notification backends the state is built from.
pub struct Backends<S> {
    pub orders: S,
    pub catalog: Arc<dyn Catalog>,
    pub users: Arc<dyn UserStore>,
    pub notifier: Arc<dyn OrderNotifier>,
}

impl Backends<InMemoryOrderStore> {
    /// In-memory stores, used when no database is configured.
    pub fn in_memory(notifier: Arc<dyn OrderNotifier>) -> Self {
        Self {
            orders: InMemoryOrderStore::new(),
            catalog: Arc::new(InMemoryCatalog::new()),
            users: Arc::new(InMemoryUserStore::new()),
            notifier,
        }
    }
}

/// Builds the application state and seeds an empty catalog and user table.
pub async fn create_default_state<S: OrderStore + Clone + 'static>(
    backends: Backends<S>,
    display_offset: FixedOffset,
    seed_password: &str,
) -> Result<Arc<AppState<S>>, DomainError> {
    let catalog = CatalogService::new(backends.catalog.clone());
    let auth = AuthService::new(backends.users);

    if catalog.seed_defaults().await? {
        tracing::info!("seeded default catalog");
    }
    auth.seed_if_empty(seed_password).await?;

    let orders = OrderService::new(
        backends.orders.clone(),
        backends.catalog,
        backends.notifier,
    );
    let reports = ReportService::new(backends.orders, Aggregator::new(display_offset));

    Ok(Arc::new(AppState {
        orders,
        reports,
        catalog,
        auth,
    }))
}
