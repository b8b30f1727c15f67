//! Export estimation results to CSV and JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream scripts;
//! the JSON carries the full run (selection, chart URL, skipped products).

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::domain::{ProductRecord, Selection};
use crate::error::AppError;

/// Write presented rows to a CSV file (one column per `ProductRecord` field).
pub fn write_results_csv(path: &Path, rows: &[ProductRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for r in rows {
        writer
            .serialize(r)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    // An empty export still gets a header line.
    if rows.is_empty() {
        writer
            .write_record(RESULT_COLUMNS)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

const RESULT_COLUMNS: [&str; 10] = [
    "name",
    "price_elasticity",
    "price_mean",
    "quantity_mean",
    "intercept",
    "t_score",
    "slope",
    "coefficient_pvalue",
    "rsquared",
    "brand",
];

#[derive(Debug, Serialize)]
struct SkippedEntry<'a> {
    name: &'a str,
    reason: String,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    tool: &'static str,
    generated_at: DateTime<Utc>,
    selection: &'a Selection,
    chart_url: Option<&'a str>,
    products: &'a [ProductRecord],
    skipped: Vec<SkippedEntry<'a>>,
}

/// Write the whole run as a JSON report.
pub fn write_run_json(path: &Path, run: &RunOutput, chart_url: Option<&str>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    let report = RunReport {
        tool: "elast",
        generated_at: Utc::now(),
        selection: &run.selection,
        chart_url,
        products: &run.presented,
        skipped: run
            .skipped
            .iter()
            .map(|s| SkippedEntry {
                name: &s.name,
                reason: s.reason.to_string(),
            })
            .collect(),
    };

    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    Ok(())
}
