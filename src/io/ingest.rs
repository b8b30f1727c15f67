//! CSV ingest and validation of observation rows.
//!
//! This module is responsible for turning the exported price/impression CSV
//! into a clean, read-only list of `Observation`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Order preserving** (row order decides "first brand seen" later on)
//! - **Separation of concerns**: no estimation logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::Observation;
use crate::error::AppError;

/// Canonical column name plus accepted aliases (all lowercase).
const COLUMNS: [(&str, &[&str]); 7] = [
    ("name", &["name", "product", "product_name"]),
    ("merchant", &["merchant"]),
    ("category", &["category_name", "category"]),
    ("period", &["week", "period"]),
    ("price", &["discount_price", "price"]),
    ("demand", &["impression", "impressions", "demand"]),
    ("brand", &["brand"]),
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// The loaded observation table.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Dataset {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let rows_read = observations.len();
        Self {
            observations,
            row_errors: Vec::new(),
            rows_read,
        }
    }
}

/// Load observations from a CSV file.
pub fn load_observations(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    let dataset = read_observations(file)?;
    info!(
        path = %path.display(),
        rows = dataset.rows_read,
        rejected = dataset.row_errors.len(),
        "loaded observations"
    );
    Ok(dataset)
}

/// Parse observations from any CSV reader.
pub fn read_observations<R: Read>(reader: R) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &columns) {
            Ok(obs) => observations.push(obs),
            Err(message) => {
                debug!(line, %message, "rejected row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), "some rows were rejected during ingest");
    }
    if observations.is_empty() {
        return Err(AppError::new(3, "No valid observation rows in CSV."));
    }

    Ok(Dataset {
        observations,
        row_errors,
        rows_read,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Map canonical column names to indices, failing on the first missing one.
fn resolve_columns(headers: &StringRecord) -> Result<HashMap<&'static str, usize>, AppError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    let mut columns = HashMap::new();
    for (canonical, aliases) in COLUMNS {
        let idx = aliases
            .iter()
            .find_map(|a| header_map.get(*a).copied())
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Missing required column: `{}`", aliases[0]),
                )
            })?;
        columns.insert(canonical, idx);
    }
    Ok(columns)
}

fn parse_row(record: &StringRecord, columns: &HashMap<&'static str, usize>) -> Result<Observation, String> {
    let name = get_required(record, columns, "name")?.to_string();
    let merchant = get_required(record, columns, "merchant")?.to_string();
    let category = get_required(record, columns, "category")?.to_string();
    // Brand only feeds the merge after fitting, so a blank cell is not a row error.
    let brand = get_optional(record, columns, "brand").map(str::to_string);

    let period = parse_period(get_required(record, columns, "period")?)?;

    let price = parse_f64(get_required(record, columns, "price")?, "price")?;
    if price <= 0.0 {
        return Err(format!("Invalid `price` {price} (must be > 0)."));
    }

    let demand = parse_f64(get_required(record, columns, "demand")?, "demand")?;
    if demand < 0.0 {
        return Err(format!("Invalid `demand` {demand} (must be >= 0)."));
    }

    Ok(Observation {
        name,
        merchant,
        category,
        period,
        price,
        demand,
        brand,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    columns: &HashMap<&'static str, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = columns
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    columns: &HashMap<&'static str, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = columns.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Periods are ordinals; accept integral floats like `12.0` from spreadsheet exports.
fn parse_period(s: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(format!("Invalid period '{s}' (expected an integer).")),
    }
}

fn parse_f64(s: &str, field: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid `{field}` value '{s}'.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "name,merchant,Category_name,Week,Discount_price,Impression,brand\n";

    #[test]
    fn reads_rows_in_order_with_canonical_headers() {
        let csv = format!(
            "{HEADER}TV 1,Walmart.com,\"tv, television, led\",3,199.99,120,Acme\n\
             TV 2,Walmart.com,\"tv, television, led\",4,249.0,80,Globex\n"
        );
        let ds = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(ds.rows_read, 2);
        assert!(ds.row_errors.is_empty());
        assert_eq!(ds.observations[0].name, "TV 1");
        assert_eq!(ds.observations[0].category, "tv, television, led");
        assert_eq!(ds.observations[1].period, 4);
        assert_eq!(ds.observations[1].brand.as_deref(), Some("Globex"));
    }

    #[test]
    fn accepts_aliases_and_bom() {
        let csv = "\u{feff}Product,Merchant,Category,Period,Price,Demand,Brand\nA,m,c,1.0,2.5,3,B\n";
        let ds = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(ds.observations[0].period, 1);
        assert_eq!(ds.observations[0].price, 2.5);
    }

    #[test]
    fn blank_brand_keeps_the_row_in_the_fit() {
        let csv = format!(
            "{HEADER}Cam,Walmart.com,\"car, gps, dash\",1,10,100,Acme\n\
             Cam,Walmart.com,\"car, gps, dash\",2,11,92,Acme\n\
             Cam,Walmart.com,\"car, gps, dash\",3,12,85,\n\
             Cam,Walmart.com,\"car, gps, dash\",4,13,76,Acme\n\
             Cam,Walmart.com,\"car, gps, dash\",5,14,70\n"
        );
        let ds = read_observations(csv.as_bytes()).unwrap();
        assert!(ds.row_errors.is_empty());
        assert_eq!(ds.observations.len(), 5);
        assert_eq!(ds.observations[2].brand, None);
        assert_eq!(ds.observations[4].brand, None);

        let selection = crate::domain::Selection::new("Walmart.com", "car, gps, dash");
        let run = crate::app::pipeline::run_estimate(&ds, &selection);
        let record = &run.presented[0];
        // Week 3 takes part: mean demand over all five weeks.
        assert!((record.quantity_mean - 84.6).abs() < 1e-9);
        assert!((record.slope + 7.6).abs() < 1e-9);
        assert_eq!(record.brand.as_deref(), Some("Acme"));
    }

    #[test]
    fn bad_rows_are_reported_not_fatal() {
        let csv = format!(
            "{HEADER}A,m,c,1,10,5,B\n\
             A,m,c,x,10,5,B\n\
             A,m,c,2,-1,5,B\n\
             A,m,c,3,10,-5,B\n\
             A,m,c,4,10,nan,B\n"
        );
        let ds = read_observations(csv.as_bytes()).unwrap();
        assert_eq!(ds.observations.len(), 1);
        assert_eq!(ds.row_errors.len(), 4);
        assert_eq!(ds.row_errors[0].line, 3);
    }

    #[test]
    fn missing_column_is_a_usage_error() {
        let csv = "name,merchant,Week,Discount_price,Impression,brand\nA,m,1,1,1,B\n";
        let err = read_observations(csv.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("category_name"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obs.csv");
        std::fs::write(&path, format!("{HEADER}A,m,c,1,10,5,B\n")).unwrap();
        let ds = load_observations(&path).unwrap();
        assert_eq!(ds.observations.len(), 1);

        let err = load_observations(&dir.path().join("missing.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
