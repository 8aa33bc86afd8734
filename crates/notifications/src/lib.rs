//! Notifications sent after an order has been recorded.
//!
//! Delivery is best effort. Callers log a failed notification and carry on;
//! an order is never rolled back because a notification could not be sent.

pub mod error;
pub mod memory;
pub mod notifier;
pub mod webhook;

pub use error::NotifyError;
pub use memory::InMemoryNotifier;
pub use notifier::{LogNotifier, OrderNotifier, OrderPlaced, PlacedItem};
pub use webhook::WebhookNotifier;
