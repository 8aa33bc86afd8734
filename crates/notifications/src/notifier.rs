//! Notifier trait and the order-placed message.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use common::{DISPLAY_TIME_FORMAT, Money};

use crate::error::NotifyError;

/// One line of a placed order, as announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedItem {
    pub name: String,
    pub quantity: u32,
}

/// A checkout that has been durably recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlaced {
    pub submitter: String,
    pub items: Vec<PlacedItem>,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
}

impl OrderPlaced {
    /// Renders the human-readable announcement.
    ///
    /// `offset` is the timezone the date is shown in.
    pub fn message(&self, offset: &FixedOffset) -> String {
        let items = self
            .items
            .iter()
            .map(|i| format!("• {} x{}", i.name, i.quantity))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "NEW ORDER\nMember: {}\nItems:\n{}\nTotal: {}\nDate: {}",
            self.submitter,
            items,
            self.total,
            self.placed_at
                .with_timezone(offset)
                .format(DISPLAY_TIME_FORMAT)
        )
    }
}

/// Announces newly placed orders.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// Delivers a notification for a recorded order.
    async fn notify(&self, order: &OrderPlaced) -> Result<(), NotifyError>;
}

/// Notifier that only writes to the log; used when no webhook is configured.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    offset: FixedOffset,
}

impl LogNotifier {
    /// Creates a log notifier rendering dates in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify(&self, order: &OrderPlaced) -> Result<(), NotifyError> {
        tracing::info!(
            submitter = %order.submitter,
            total = %order.total,
            message = %order.message(&self.offset),
            "order placed"
        );
        Ok(())
    }
}
