use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::models::ApplicationRecord;

pub const DEFAULT_FILENAME: &str = "job_applications.csv";

const HEADER: &str = "Company,Position,Location,Status,Date,Salary,Notes";

/// Quote a free-text field. Embedded double quotes are doubled so the field
/// survives commas and quotes in user input.
fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Date column is the plain ISO calendar date, independent of locale.
/// Anything unparseable passes through as-is rather than dropping data.
fn csv_date(record: &ApplicationRecord) -> String {
    let day = record.date_only();
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => record.date.clone(),
    }
}

/// Serialize the full collection, in arrival order, to CSV text. Search,
/// filter and sort never apply here.
pub fn to_csv(records: &[ApplicationRecord]) -> String {
    let mut lines = vec![HEADER.to_string()];
    for record in records {
        lines.push(
            [
                quoted(&record.company),
                quoted(&record.position),
                quoted(&record.location),
                record.status.value().to_string(),
                csv_date(record),
                record.salary.clone(),
                quoted(&record.notes),
            ]
            .join(","),
        );
    }
    lines.join("\n")
}

pub fn write_csv(records: &[ApplicationRecord], path: &Path) -> Result<()> {
    std::fs::write(path, to_csv(records))
        .with_context(|| format!("Failed to write {}", path.display()))
}
