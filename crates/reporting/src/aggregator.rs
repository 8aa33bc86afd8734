//! Groups order lines into submissions.

use std::collections::HashMap;

use chrono::{FixedOffset, Offset, Utc};
use common::{DISPLAY_TIME_FORMAT, Money, SubmissionId};
use serde::Serialize;
use store::OrderLine;

use crate::error::{ReportError, Result};

/// One checkout as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub user: String,
    /// `"<name> x<quantity> ($<line total>)"` per line, in cart order.
    pub items: Vec<String>,
    /// Sum of the line totals, recomputed on every read.
    pub total: Money,
    /// Placement time rendered in the display offset.
    pub time: String,
}

/// Renders one line as `"Ammo x2 ($10000)"`.
pub fn format_line(line: &OrderLine) -> String {
    format!("{} x{} ({})", line.item, line.quantity, line.line_total)
}

/// Sums the totals of every submission.
pub fn grand_total(submissions: &[Submission]) -> Result<Money> {
    Money::checked_sum(submissions.iter().map(|s| s.total)).ok_or(ReportError::GrandTotalOverflow)
}

/// Groups order lines by `(submitter, submission id)`.
///
/// Grouping is a pure function of its input: groups keep the order in which
/// they first appear and lines keep their order inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregator {
    offset: FixedOffset,
}

impl Aggregator {
    /// Creates an aggregator rendering times in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates an aggregator rendering times in UTC.
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Returns the display offset.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Groups `lines` (already ordered newest first) into submissions.
    ///
    /// Fails with `TotalOverflow` if a submission total does not fit.
    pub fn group(&self, lines: &[OrderLine]) -> Result<Vec<Submission>> {
        let mut submissions: Vec<Submission> = Vec::new();
        let mut index: HashMap<(&str, SubmissionId), usize> = HashMap::new();

        for line in lines {
            let key = (line.submitter.as_str(), line.submission_id);
            let slot = *index.entry(key).or_insert_with(|| {
                submissions.push(Submission {
                    id: line.submission_id,
                    user: line.submitter.clone(),
                    items: Vec::new(),
                    total: Money::zero(),
                    time: line
                        .placed_at
                        .with_timezone(&self.offset)
                        .format(DISPLAY_TIME_FORMAT)
                        .to_string(),
                });
                submissions.len() - 1
            });

            let submission = &mut submissions[slot];
            submission.items.push(format_line(line));
            submission.total = submission
                .total
                .checked_add(line.line_total)
                .ok_or_else(|| ReportError::TotalOverflow {
                    user: submission.user.clone(),
                })?;
        }

        Ok(submissions)
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::utc()
    }
}
