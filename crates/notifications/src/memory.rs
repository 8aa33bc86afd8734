//! In-memory notifier for tests.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::notifier::{OrderNotifier, OrderPlaced};

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<OrderPlaced>,
    fail_on_notify: bool,
}

/// In-memory notifier that records every delivered order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail every delivery.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state.write().unwrap().fail_on_notify = fail;
    }

    /// Returns every order delivered so far.
    pub fn sent(&self) -> Vec<OrderPlaced> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns the number of delivered notifications.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }
}

#[async_trait]
impl OrderNotifier for InMemoryNotifier {
    async fn notify(&self, order: &OrderPlaced) -> Result<(), NotifyError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_notify {
            return Err(NotifyError::Delivery("webhook unavailable".to_string()));
        }

        state.sent.push(order.clone());
        Ok(())
    }
}
