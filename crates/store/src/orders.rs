use async_trait::async_trait;

use crate::{NewSubmission, OrderLine, Result};

/// Append-only storage for order lines.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Appends every line of a submission.
    ///
    /// Lines are appended atomically: a concurrent reader sees either all of
    /// them or none. Fails with `EmptySubmission` when there are no lines.
    ///
    /// Returns the stored lines in cart order.
    async fn append(&self, submission: NewSubmission) -> Result<Vec<OrderLine>>;

    /// Retrieves every line, newest submission first.
    ///
    /// Ties on `placed_at` are broken by insertion order (newest first);
    /// lines of one submission stay in cart order.
    async fn list_all(&self) -> Result<Vec<OrderLine>>;

    /// Retrieves the lines of one submitter, ordered like [`list_all`].
    ///
    /// [`list_all`]: OrderStore::list_all
    async fn list_by(&self, submitter: &str) -> Result<Vec<OrderLine>>;
}
