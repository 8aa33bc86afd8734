//! Spreadsheet export of submissions.

use common::Money;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use crate::aggregator::{Submission, grand_total};
use crate::error::{ReportError, Result};

/// File name offered to the browser.
pub const EXPORT_FILENAME: &str = "orders.xlsx";

/// MIME type of the workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Orders";
const HEADERS: [&str; 4] = ["User", "Items", "Total", "Time"];
const COLUMN_WIDTHS: [f64; 4] = [18.0, 36.0, 14.0, 22.0];
const CURRENCY_FORMAT: &str = "$#,##0";

/// One spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub user: String,
    /// Item descriptions joined with newlines, one per line in the cell.
    pub items: String,
    pub total: Money,
    pub time: String,
}

/// Maps submissions to spreadsheet rows, preserving their order.
pub fn rows(submissions: &[Submission]) -> Vec<ExportRow> {
    submissions
        .iter()
        .map(|s| ExportRow {
            user: s.user.clone(),
            items: s.items.join("\n"),
            total: s.total,
            time: s.time.clone(),
        })
        .collect()
}

/// Renders submissions as an xlsx workbook.
///
/// The sheet has a bold header row, one row per submission and a final
/// `Grand Total` row equal to [`grand_total`] over the same submissions.
/// Totals are checked before the workbook is built, so an amount that
/// overflows or cannot be stored exactly yields an error and no bytes.
pub fn render(submissions: &[Submission]) -> Result<Vec<u8>> {
    let total = cell_amount(grand_total(submissions)?)?;
    let rows = rows(submissions)
        .into_iter()
        .map(|row| Ok((cell_amount(row.total)?, row)))
        .collect::<Result<Vec<_>>>()?;

    let header_format = Format::new().set_bold();
    let text_format = Format::new().set_align(FormatAlign::Top);
    let items_format = Format::new().set_text_wrap().set_align(FormatAlign::Top);
    let money_format = Format::new()
        .set_num_format(CURRENCY_FORMAT)
        .set_align(FormatAlign::Top);
    let total_label_format = Format::new().set_bold();
    let total_format = Format::new().set_bold().set_num_format(CURRENCY_FORMAT);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in (0u16..).zip(HEADERS.iter().zip(COLUMN_WIDTHS)) {
        worksheet.write_string_with_format(0, col, *header, &header_format)?;
        worksheet.set_column_width(col, width)?;
    }

    let mut next_row = 1u32;
    for (amount, row) in rows {
        worksheet.write_string_with_format(next_row, 0, row.user, &text_format)?;
        worksheet.write_string_with_format(next_row, 1, row.items, &items_format)?;
        worksheet.write_number_with_format(next_row, 2, amount, &money_format)?;
        worksheet.write_string_with_format(next_row, 3, row.time, &text_format)?;
        next_row += 1;
    }

    worksheet.write_string_with_format(next_row, 0, "Grand Total", &total_label_format)?;
    worksheet.write_number_with_format(next_row, 2, total, &total_format)?;

    Ok(workbook.save_to_buffer()?)
}

fn cell_amount(amount: Money) -> Result<f64> {
    amount
        .to_f64_exact()
        .ok_or(ReportError::InexactAmount(amount))
}

#[cfg(test)]
mod tests {
    use common::SubmissionId;

    use super::*;

    fn submission(user: &str, items: &[&str], total: i64) -> Submission {
        Submission {
            id: SubmissionId::new(),
            user: user.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
            total: Money::from_units(total),
            time: "2024-05-01 09:00:00".to_string(),
        }
    }

    #[test]
    fn rows_join_items_with_newlines() {
        let submissions = vec![submission(
            "member1",
            &["Ammo x2 ($10000)", "Vest x1 ($15000)"],
            25000,
        )];

        let rows = rows(&submissions);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user, "member1");
        assert_eq!(rows[0].items, "Ammo x2 ($10000)\nVest x1 ($15000)");
        assert_eq!(rows[0].total, Money::from_units(25000));
        assert_eq!(rows[0].time, "2024-05-01 09:00:00");
    }

    #[test]
    fn rows_keep_submission_order() {
        let submissions = vec![
            submission("member2", &["Pistol x1 ($40000)"], 40000),
            submission("member1", &["Ammo x1 ($5000)"], 5000),
        ];

        let users: Vec<_> = rows(&submissions).into_iter().map(|r| r.user).collect();

        assert_eq!(users, vec!["member2", "member1"]);
    }

    #[test]
    fn render_produces_xlsx_archive() {
        let submissions = vec![submission("member1", &["Ammo x2 ($10000)"], 10000)];

        let bytes = render(&submissions).unwrap();

        // xlsx files are zip archives.
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn render_rejects_amounts_beyond_exact_range() {
        let big = Money::MAX_EXACT.units();
        let submissions = vec![
            submission("member1", &["Tank x1"], big),
            submission("member2", &["Tank x1"], big),
        ];

        let result = render(&submissions);

        assert!(matches!(result, Err(ReportError::InexactAmount(_))));
    }

    #[test]
    fn render_rejects_overflowing_grand_total() {
        let half = i64::MAX / 2;
        let submissions = vec![
            submission("member1", &["Tank x1"], half),
            submission("member1", &["Tank x1"], half),
            submission("member1", &["Tank x1"], half),
        ];

        let result = render(&submissions);

        assert!(matches!(result, Err(ReportError::GrandTotalOverflow)));
    }

    #[test]
    fn render_handles_no_submissions() {
        let bytes = render(&[]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
