//! CSV export of the filtered bill listing.
//!
//! Produces an Excel-compatible byte stream: every field double-quoted with
//! internal quotes doubled, CRLF row separators, monetary columns rounded to
//! whole units and the paid flag rendered Yes/No.

use shared::BillFilter;
use tracing::info;

use crate::db::DbConnection;
use crate::domain::models::bill::BillRow;
use crate::error::LedgerError;
use crate::storage::BillRepository;

const EXPORT_HEADER: [&str; 11] = [
    "Bill ID", "Tenant", "Room", "Month", "Year", "Start", "End", "Units", "Light Bill", "Total",
    "Paid",
];

/// A rendered CSV export ready to hand to the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    pub row_count: usize,
}

#[derive(Clone)]
pub struct ExportService {
    bills: BillRepository,
}

impl ExportService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            bills: BillRepository::new(db),
        }
    }

    /// Export the filtered bills, most recent first, as CSV.
    pub async fn export_csv(&self, filter: &BillFilter) -> Result<CsvExport, LedgerError> {
        let rows = self.bills.list(filter).await?;

        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(csv_line(EXPORT_HEADER.iter().map(|s| s.to_string())));
        for row in &rows {
            lines.push(csv_line(export_fields(row).into_iter()));
        }
        let content = lines.join("\r\n");

        let export = CsvExport {
            filename: export_filename(filter),
            content,
            row_count: rows.len(),
        };

        info!(
            "Exported {} bills to {} ({} bytes)",
            export.row_count,
            export.filename,
            export.content.len()
        );

        Ok(export)
    }
}

fn export_fields(row: &BillRow) -> Vec<String> {
    let bill = &row.bill;
    vec![
        bill.id.to_string(),
        row.tenant_name.clone(),
        row.room.clone().unwrap_or_default(),
        bill.month.to_string(),
        bill.year.to_string(),
        bill.start_reading.to_string(),
        bill.end_reading.to_string(),
        bill.units.to_string(),
        (bill.light_bill.round() as i64).to_string(),
        (bill.total.round() as i64).to_string(),
        if bill.paid { "Yes" } else { "No" }.to_string(),
    ]
}

fn csv_line(fields: impl Iterator<Item = String>) -> String {
    fields
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Filename named after the filter scope.
fn export_filename(filter: &BillFilter) -> String {
    match (filter.month, filter.year) {
        (None, None) => "reports_all_time.csv".to_string(),
        (None, Some(year)) => format!("reports_{}.csv", year),
        (Some(month), Some(year)) => format!("reports_{:02}-{}.csv", month, year),
        (Some(month), None) => format!("reports_month_{}.csv", month),
    }
}
