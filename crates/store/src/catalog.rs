use async_trait::async_trait;
use common::Money;

use crate::Result;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub price: Money,
}

impl Item {
    /// Creates a catalog item.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// The catalog seeded on first start.
    pub fn defaults() -> Vec<Item> {
        vec![
            Item::new("Ammo", Money::from_units(5000)),
            Item::new("Vest", Money::from_units(15000)),
            Item::new("Pistol", Money::from_units(40000)),
        ]
    }
}

/// Mapping from item name to unit price.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up the unit price of an item.
    ///
    /// Fails with `ItemNotFound` for unknown names.
    async fn price(&self, name: &str) -> Result<Money>;

    /// Lists every item ordered by name.
    async fn list(&self) -> Result<Vec<Item>>;

    /// Inserts a new item. Fails with `ItemAlreadyExists` on a duplicate name.
    async fn add(&self, item: Item) -> Result<()>;

    /// Inserts `items` only if the catalog is empty.
    ///
    /// Returns true if the catalog was seeded.
    async fn seed_if_empty(&self, items: Vec<Item>) -> Result<bool>;
}
