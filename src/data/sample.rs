//! Synthetic weekly price/impression data for demos and tests.
//!
//! Every merchant/category pair of the enumeration gets a handful of products.
//! Most follow a constant-elasticity demand curve with multiplicative noise; a
//! few are deliberately awkward:
//! - fixed price (regression cannot identify a slope)
//! - demand unrelated to price (usually fails the significance gate)
//! - duplicate listings in the same week (exercises aggregation)
//!
//! Some weeks are missing at random so forward-fill has something to do.

use std::fs::File;
use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{MerchantCatalog, Observation};
use crate::error::AppError;

const BRANDS: [&str; 8] = [
    "Acme", "Northwind", "Globex", "Initech", "Umbrella", "Vandelay", "Hooli", "Stark",
];

/// Probability that a given product/week row is absent.
const MISSING_WEEK_PROB: f64 = 0.12;
/// Relative demand noise (std dev of the multiplicative factor).
const DEMAND_NOISE: f64 = 0.06;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub seed: u64,
    pub products_per_selection: usize,
    pub periods: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            products_per_selection: 6,
            periods: 26,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductKind {
    Elastic,
    FixedPrice,
    Unrelated,
    DuplicateListings,
}

impl ProductKind {
    fn for_index(i: usize) -> Self {
        match i % 6 {
            3 => ProductKind::FixedPrice,
            4 => ProductKind::Unrelated,
            5 => ProductKind::DuplicateListings,
            _ => ProductKind::Elastic,
        }
    }
}

/// Generate observations for every selection in `catalog`.
pub fn generate_sample(
    catalog: &MerchantCatalog,
    config: &SampleConfig,
) -> Result<Vec<Observation>, AppError> {
    if config.products_per_selection == 0 {
        return Err(AppError::new(2, "Products per selection must be > 0."));
    }
    if config.periods < 3 {
        return Err(AppError::new(2, "Sample needs at least 3 periods."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, DEMAND_NOISE)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut out = Vec::new();
    let mut serial = 0usize;

    for selection in catalog.selections() {
        let head = category_head(&selection.category);
        for i in 0..config.products_per_selection {
            serial += 1;
            let kind = ProductKind::for_index(i);
            let brand = BRANDS[rng.gen_range(0..BRANDS.len())];
            let name = format!("{brand} {head} {serial:03}");

            let base_price: f64 = rng.gen_range(40.0..900.0);
            let base_demand: f64 = rng.gen_range(300.0..3000.0);
            let elasticity: f64 = rng.gen_range(-3.5..-0.4);

            for week in 1..=config.periods as i64 {
                // Keep the first week so every product has at least one row.
                if week > 1 && rng.gen_bool(MISSING_WEEK_PROB) {
                    continue;
                }

                let price = match kind {
                    ProductKind::FixedPrice => round_cents(base_price),
                    _ => round_cents(base_price * rng.gen_range(0.7..1.1)),
                };
                let factor = (1.0 + noise.sample(&mut rng)).max(0.0);
                let demand = match kind {
                    ProductKind::Unrelated => base_demand * rng.gen_range(0.6..1.4),
                    _ => base_demand * (price / base_price).powf(elasticity) * factor,
                }
                .round();

                let row = |price: f64, demand: f64| Observation {
                    name: name.clone(),
                    merchant: selection.merchant.clone(),
                    category: selection.category.clone(),
                    period: week,
                    price,
                    demand,
                    brand: Some(brand.to_string()),
                };

                if kind == ProductKind::DuplicateListings {
                    // Two listings whose mean price and summed demand match the curve.
                    let spread = round_cents(price * 0.02);
                    let half = (demand / 2.0).floor();
                    out.push(row(price - spread, half));
                    out.push(row(price + spread, demand - half));
                } else {
                    out.push(row(price, demand));
                }
            }
        }
    }

    Ok(out)
}

/// Write observations with the column names of the marketplace export.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    let io_err = |e: csv::Error| AppError::new(4, format!("Failed to write sample CSV: {e}"));

    writer
        .write_record([
            "name",
            "merchant",
            "Category_name",
            "Week",
            "Discount_price",
            "Impression",
            "brand",
        ])
        .map_err(io_err)?;
    for o in observations {
        let period = o.period.to_string();
        let price = format!("{:.2}", o.price);
        let demand = format!("{}", o.demand);
        writer
            .write_record([
                o.name.as_str(),
                o.merchant.as_str(),
                o.category.as_str(),
                period.as_str(),
                price.as_str(),
                demand.as_str(),
                o.brand.as_deref().unwrap_or(""),
            ])
            .map_err(io_err)?;
    }
    writer.flush().map_err(|e| AppError::new(4, format!("Failed to flush sample CSV: {e}")))?;
    Ok(())
}

fn category_head(category: &str) -> String {
    let head = category.split(',').next().unwrap_or(category).trim();
    let mut chars = head.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => "Item".to_string(),
    }
}

fn round_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_estimate;
    use crate::error::SkipReason;
    use crate::io::ingest::load_observations;

    fn small() -> SampleConfig {
        SampleConfig {
            seed: 7,
            products_per_selection: 6,
            periods: 20,
        }
    }

    #[test]
    fn same_seed_same_data() {
        let catalog = MerchantCatalog::default();
        let a = generate_sample(&catalog, &small()).unwrap();
        let b = generate_sample(&catalog, &small()).unwrap();
        assert_eq!(a, b);

        let other = SampleConfig { seed: 8, ..small() };
        assert_ne!(a, generate_sample(&catalog, &other).unwrap());
    }

    #[test]
    fn covers_every_selection() {
        let catalog = MerchantCatalog::default();
        let obs = generate_sample(&catalog, &small()).unwrap();
        for sel in catalog.selections() {
            assert!(obs.iter().any(|o| o.merchant == sel.merchant && o.category == sel.category));
        }
        assert!(obs.iter().all(|o| o.price > 0.0 && o.demand >= 0.0));
    }

    #[test]
    fn rejects_bad_config() {
        let catalog = MerchantCatalog::default();
        let zero = SampleConfig {
            products_per_selection: 0,
            ..small()
        };
        assert_eq!(generate_sample(&catalog, &zero).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn category_head_is_capitalized() {
        assert_eq!(category_head("camera, mirrorless"), "Camera");
        assert_eq!(category_head("tv, television, led"), "Tv");
    }

    #[test]
    fn sample_round_trips_through_ingest_and_estimates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.csv");
        let catalog = MerchantCatalog::default();
        let obs = generate_sample(&catalog, &small()).unwrap();
        write_observations_csv(&path, &obs).unwrap();

        let dataset = load_observations(&path).unwrap();
        assert_eq!(dataset.observations.len(), obs.len());
        assert!(dataset.row_errors.is_empty());

        let selection = catalog
            .validate(Some("Walmart.com"), Some("car, gps, dash"))
            .unwrap();
        let run = run_estimate(&dataset, &selection);
        assert!(!run.presented.is_empty());
        assert!(run.presented.iter().any(|r| r.price_elasticity < 0.0));
        // Fixed-price products can never be fitted.
        assert!(
            run.skipped
                .iter()
                .any(|s| s.reason == SkipReason::DegenerateFit)
        );
    }
}
