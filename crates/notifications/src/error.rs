//! Notification error types.

use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP request could not be sent.
    #[error("Notification request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The receiver answered with a non-success status.
    #[error("Notification rejected with status {0}")]
    Status(u16),

    /// Delivery failed for another reason.
    #[error("Notification failed: {0}")]
    Delivery(String),
}
