//! Order service: validates a cart, prices it from the catalog and records it.

use std::sync::Arc;

use common::{Money, SubmissionId};
use notifications::{OrderNotifier, OrderPlaced, PlacedItem};
use store::{Catalog, NewOrderLine, NewSubmission, OrderLine, OrderStore, StoreError};

use crate::access::{Identity, require_identity};
use crate::cart::{CartEntry, parse_quantity};
use crate::error::{DomainError, OrderError};

/// Result of a successfully recorded checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub submission_id: SubmissionId,
    pub total: Money,
    pub lines: Vec<OrderLine>,
}

/// Service for placing orders.
///
/// Owns the order store and resolves every unit price through the catalog.
/// After a cart is stored the notifier is told about it; a failed
/// notification is logged and does not affect the recorded order.
pub struct OrderService<S: OrderStore> {
    store: S,
    catalog: Arc<dyn Catalog>,
    notifier: Arc<dyn OrderNotifier>,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service.
    pub fn new(store: S, catalog: Arc<dyn Catalog>, notifier: Arc<dyn OrderNotifier>) -> Self {
        Self {
            store,
            catalog,
            notifier,
        }
    }

    /// Returns a reference to the underlying order store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records one checkout for `identity`.
    ///
    /// Every entry is validated and priced before anything is written, so a
    /// rejected cart leaves no rows behind.
    #[tracing::instrument(skip(self, identity, cart), fields(entries = cart.len()))]
    pub async fn place_order(
        &self,
        identity: Option<&Identity>,
        cart: Vec<CartEntry>,
    ) -> Result<PlacedOrder, DomainError> {
        let identity = require_identity(identity)?;

        if cart.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let mut lines = Vec::with_capacity(cart.len());
        let mut total = Money::zero();

        for entry in &cart {
            let quantity = parse_quantity(&entry.name, &entry.quantity)?;
            let unit_price = self.resolve_price(entry).await?;

            let line_total = unit_price
                .checked_multiply(quantity)
                .filter(|amount| *amount <= Money::MAX_EXACT)
                .ok_or_else(|| OrderError::AmountOverflow {
                    item: entry.name.clone(),
                })?;
            total = total
                .checked_add(line_total)
                .filter(|amount| *amount <= Money::MAX_EXACT)
                .ok_or_else(|| OrderError::AmountOverflow {
                    item: entry.name.clone(),
                })?;

            lines.push(NewOrderLine {
                item: entry.name.clone(),
                quantity,
                unit_price,
                line_total,
            });
        }

        let submission = NewSubmission::new(identity.username.clone(), lines);
        let submission_id = submission.id;
        let stored = self.store.append(submission).await?;

        metrics::counter!("orders_placed_total").increment(1);
        metrics::counter!("order_lines_total").increment(stored.len() as u64);
        tracing::info!(
            %submission_id,
            submitter = %identity.username,
            %total,
            "order recorded"
        );

        self.announce(&stored, total).await;

        Ok(PlacedOrder {
            submission_id,
            total,
            lines: stored,
        })
    }

    async fn resolve_price(&self, entry: &CartEntry) -> Result<Money, DomainError> {
        let unit_price = self.catalog.price(&entry.name).await.map_err(|e| match e {
            StoreError::ItemNotFound(name) => DomainError::Order(OrderError::ItemNotFound(name)),
            other => DomainError::Store(other),
        })?;

        if let Some(client_price) = &entry.price {
            tracing::debug!(
                item = %entry.name,
                %client_price,
                catalog_price = %unit_price,
                "ignoring client-supplied price"
            );
        }

        Ok(unit_price)
    }

    async fn announce(&self, lines: &[OrderLine], total: Money) {
        let Some(first) = lines.first() else {
            return;
        };

        let event = OrderPlaced {
            submitter: first.submitter.clone(),
            items: lines
                .iter()
                .map(|l| PlacedItem {
                    name: l.item.clone(),
                    quantity: l.quantity,
                })
                .collect(),
            total,
            placed_at: first.placed_at,
        };

        if let Err(e) = self.notifier.notify(&event).await {
            metrics::counter!("order_notifications_failed_total").increment(1);
            tracing::warn!(error = %e, submitter = %event.submitter, "order notification failed");
        }
    }
}
