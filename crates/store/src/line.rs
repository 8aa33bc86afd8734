use chrono::{DateTime, Utc};
use common::{Money, SubmissionId};

/// One stored order line.
///
/// Lines are immutable once appended. `sequence` is assigned by the store
/// once per submission and grows with insertion order; `line_no` is the
/// position of the line inside its cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub submission_id: SubmissionId,
    pub sequence: i64,
    pub line_no: u32,
    pub submitter: String,
    pub item: String,
    pub quantity: u32,
    /// Unit price captured when the order was placed.
    pub unit_price: Money,
    pub line_total: Money,
    pub placed_at: DateTime<Utc>,
}

/// A line waiting to be appended. Prices are already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub item: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Every line of one checkout, appended as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub id: SubmissionId,
    pub submitter: String,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<NewOrderLine>,
}

impl NewSubmission {
    /// Creates a submission with a fresh id stamped with the current time.
    pub fn new(submitter: impl Into<String>, lines: Vec<NewOrderLine>) -> Self {
        Self {
            id: SubmissionId::new(),
            submitter: submitter.into(),
            placed_at: Utc::now(),
            lines,
        }
    }

    /// Overrides the submission timestamp.
    pub fn placed_at(mut self, placed_at: DateTime<Utc>) -> Self {
        self.placed_at = placed_at;
        self
    }

    /// Expands the submission into stored lines under the given sequence.
    pub(crate) fn into_lines(self, sequence: i64) -> Vec<OrderLine> {
        let NewSubmission {
            id,
            submitter,
            placed_at,
            lines,
        } = self;

        lines
            .into_iter()
            .zip(0u32..)
            .map(|(line, line_no)| OrderLine {
                submission_id: id,
                sequence,
                line_no,
                submitter: submitter.clone(),
                item: line.item,
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total,
                placed_at,
            })
            .collect()
    }
}

/// Sorts lines newest submission first, keeping cart order inside each one.
pub(crate) fn sort_newest_first(lines: &mut [OrderLine]) {
    lines.sort_by(|a, b| {
        b.placed_at
            .cmp(&a.placed_at)
            .then(b.sequence.cmp(&a.sequence))
            .then(a.line_no.cmp(&b.line_no))
    });
}
