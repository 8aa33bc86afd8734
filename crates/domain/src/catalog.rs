//! Catalog listing and the leader-only add operation.

use std::sync::Arc;

use common::Money;
use store::{Catalog, Item};

use crate::access::{Identity, require_leader};
use crate::error::{DomainError, OrderError};

/// Service for reading and extending the catalog.
#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<dyn Catalog>,
}

impl CatalogService {
    /// Creates a new catalog service.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Lists every item ordered by name.
    pub async fn list_items(&self) -> Result<Vec<Item>, DomainError> {
        Ok(self.catalog.list().await?)
    }

    /// Seeds the default catalog if it is empty.
    pub async fn seed_defaults(&self) -> Result<bool, DomainError> {
        Ok(self.catalog.seed_if_empty(Item::defaults()).await?)
    }

    /// Adds an item on behalf of a leader.
    #[tracing::instrument(skip(self, identity))]
    pub async fn add_item(
        &self,
        identity: Option<&Identity>,
        name: &str,
        price: i64,
    ) -> Result<Item, DomainError> {
        require_leader(identity)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(OrderError::InvalidItem("name must not be blank".to_string()).into());
        }
        let price = Money::from_units(price);
        if price.is_negative() {
            return Err(OrderError::InvalidItem(format!("price must not be negative: {price}")).into());
        }
        if price > Money::MAX_EXACT {
            return Err(OrderError::InvalidItem(format!("price is too large: {price}")).into());
        }

        let item = Item::new(name, price);
        self.catalog.add(item.clone()).await?;
        tracing::info!(item = %item.name, price = %item.price, "catalog item added");

        Ok(item)
    }
}
