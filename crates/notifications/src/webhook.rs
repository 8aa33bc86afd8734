//! Chat webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use chrono::FixedOffset;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::error::NotifyError;
use crate::notifier::{OrderNotifier, OrderPlaced};

/// Upper bound on one delivery so a slow receiver cannot stall an order request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Posts order announcements to a chat webhook as `{"content": "..."}`.
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: SecretString,
    offset: FixedOffset,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &"[REDACTED]")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    /// Creates a webhook notifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: SecretString, offset: FixedOffset) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            offset,
        })
    }
}

#[async_trait]
impl OrderNotifier for WebhookNotifier {
    #[tracing::instrument(skip(self, order), fields(submitter = %order.submitter))]
    async fn notify(&self, order: &OrderPlaced) -> Result<(), NotifyError> {
        let content = order.message(&self.offset);

        let response = self
            .client
            .post(self.url.expose_secret())
            .json(&WebhookPayload { content: &content })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        tracing::debug!(status = status.as_u16(), "webhook delivered");
        Ok(())
    }
}
