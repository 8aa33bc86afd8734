use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use common::Money;
use tokio::sync::RwLock;

use crate::catalog::{Catalog, Item};
use crate::line::{NewSubmission, OrderLine, sort_newest_first};
use crate::orders::OrderStore;
use crate::users::{UserRecord, UserStore};
use crate::{Result, StoreError};

#[derive(Default)]
struct OrderLog {
    lines: Vec<OrderLine>,
    next_sequence: i64,
}

/// In-memory order store.
///
/// Provides the same interface as the PostgreSQL implementation. A
/// submission is appended under one write lock, so readers never see a
/// partial cart.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    log: Arc<RwLock<OrderLog>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of lines stored.
    pub async fn line_count(&self) -> usize {
        self.log.read().await.lines.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn append(&self, submission: NewSubmission) -> Result<Vec<OrderLine>> {
        if submission.lines.is_empty() {
            return Err(StoreError::EmptySubmission);
        }

        let mut log = self.log.write().await;
        log.next_sequence += 1;
        let lines = submission.into_lines(log.next_sequence);
        log.lines.extend(lines.iter().cloned());

        Ok(lines)
    }

    async fn list_all(&self) -> Result<Vec<OrderLine>> {
        let mut lines = self.log.read().await.lines.clone();
        sort_newest_first(&mut lines);
        Ok(lines)
    }

    async fn list_by(&self, submitter: &str) -> Result<Vec<OrderLine>> {
        let mut lines: Vec<_> = self
            .log
            .read()
            .await
            .lines
            .iter()
            .filter(|l| l.submitter == submitter)
            .cloned()
            .collect();
        sort_newest_first(&mut lines);
        Ok(lines)
    }
}

/// In-memory catalog.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    items: Arc<RwLock<BTreeMap<String, Money>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding `items`.
    pub fn with_items(items: impl IntoIterator<Item = Item>) -> Self {
        let items = items.into_iter().map(|i| (i.name, i.price)).collect();
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn price(&self, name: &str) -> Result<Money> {
        self.items
            .read()
            .await
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::ItemNotFound(name.to_string()))
    }

    async fn list(&self) -> Result<Vec<Item>> {
        Ok(self
            .items
            .read()
            .await
            .iter()
            .map(|(name, price)| Item::new(name.clone(), *price))
            .collect())
    }

    async fn add(&self, item: Item) -> Result<()> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.name) {
            return Err(StoreError::ItemAlreadyExists(item.name));
        }
        items.insert(item.name, item.price);
        Ok(())
    }

    async fn seed_if_empty(&self, seed: Vec<Item>) -> Result<bool> {
        let mut items = self.items.write().await;
        if !items.is_empty() {
            return Ok(false);
        }
        items.extend(seed.into_iter().map(|i| (i.name, i.price)));
        Ok(true)
    }
}

/// In-memory user store.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryUserStore {
    /// Creates a new empty user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find(&self, username: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, user: UserRecord) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(StoreError::UserAlreadyExists(user.username));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.users.read().await.len() as u64)
    }
}
