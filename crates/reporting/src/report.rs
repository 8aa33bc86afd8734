//! Report service shared by the JSON listing and the export.

use domain::{Identity, require_leader, visible_orders};
use store::OrderStore;

use crate::aggregator::{Aggregator, Submission};
use crate::error::Result;
use crate::export;

/// Builds role-filtered, grouped views of the order log.
pub struct ReportService<S: OrderStore> {
    store: S,
    aggregator: Aggregator,
}

impl<S: OrderStore> ReportService<S> {
    /// Creates a new report service.
    pub fn new(store: S, aggregator: Aggregator) -> Self {
        Self { store, aggregator }
    }

    /// Returns the aggregator used for grouping.
    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Returns the submissions `identity` may see, newest first.
    pub async fn submissions_for(&self, identity: Option<&Identity>) -> Result<Vec<Submission>> {
        let lines = visible_orders(&self.store, identity).await?;
        self.aggregator.group(&lines)
    }

    /// Renders every submission as an xlsx workbook. Leader only.
    #[tracing::instrument(skip(self, identity))]
    pub async fn export_for(&self, identity: Option<&Identity>) -> Result<Vec<u8>> {
        let leader = require_leader(identity).map_err(domain::DomainError::from)?;
        let submissions = self.submissions_for(Some(leader)).await?;
        let bytes = export::render(&submissions)?;

        metrics::counter!("exports_total").increment(1);
        tracing::info!(
            submissions = submissions.len(),
            bytes = bytes.len(),
            "orders exported"
        );

        Ok(bytes)
    }
}
