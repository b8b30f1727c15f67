//! Shared "estimate" pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! filter -> series building -> per-product fit -> assembly -> presentation
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::{Observation, ProductRecord, Selection};
use crate::error::SkipReason;
use crate::fit::fit_product;
use crate::io::ingest::Dataset;
use crate::report::{ResultTable, assemble, present};
use crate::series::build_series;

/// A product that did not make it into the result table.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedProduct {
    pub name: String,
    pub reason: SkipReason,
}

/// All computed outputs of a single estimation run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub selection: Selection,
    /// Observation rows matching the selection.
    pub rows_matched: usize,
    /// Products in the selection (one series each).
    pub products_fitted: usize,
    pub table: ResultTable,
    pub presented: Vec<ProductRecord>,
    pub skipped: Vec<SkippedProduct>,
}

/// Execute the full estimation pipeline for one selection.
///
/// Per-product failures never abort the run; they end up in `skipped`.
pub fn run_estimate(dataset: &Dataset, selection: &Selection) -> RunOutput {
    // 1) Filter to the selection.
    let selected: Vec<Observation> = dataset
        .observations
        .iter()
        .filter(|obs| selection.matches(obs))
        .cloned()
        .collect();

    // 2) Build aligned per-product series. Every selected product has at least
    //    one aggregated cell with both price and demand, so each gets a series.
    let series = build_series(&selected);

    // 3) Fit each product.
    let mut skipped: Vec<SkippedProduct> = Vec::new();
    let mut fits = Vec::with_capacity(series.len());
    for s in &series {
        match fit_product(s) {
            Ok(fit) => fits.push(fit),
            Err(reason) => {
                debug!(product = %s.name, %reason, "skipped product");
                skipped.push(SkippedProduct {
                    name: s.name.clone(),
                    reason,
                });
            }
        }
    }

    // 4) Merge brands from the full dataset and shape the presented view.
    let table = assemble(&fits, &dataset.observations);
    let presented = present(&table);

    info!(
        merchant = %selection.merchant,
        category = %selection.category,
        rows = selected.len(),
        products = series.len(),
        retained = table.len(),
        presented = presented.len(),
        "estimation finished"
    );

    RunOutput {
        selection: selection.clone(),
        rows_matched: selected.len(),
        products_fitted: series.len(),
        table,
        presented,
        skipped,
    }
}

/// Per-selection memo of `RunOutput` for one loaded dataset.
///
/// The dataset is read-only for the lifetime of the cache, so entries never
/// need invalidating.
#[derive(Debug, Default)]
pub struct EstimateCache {
    runs: HashMap<Selection, RunOutput>,
}

impl EstimateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_run(&mut self, dataset: &Dataset, selection: &Selection) -> &RunOutput {
        self.runs
            .entry(selection.clone())
            .or_insert_with(|| run_estimate(dataset, selection))
    }

    pub fn get(&self, selection: &Selection) -> Option<&RunOutput> {
        self.runs.get(selection)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(name: &str, category: &str, period: i64, price: f64, demand: f64, brand: &str) -> Observation {
        Observation {
            name: name.to_string(),
            merchant: "Walmart.com".to_string(),
            category: category.to_string(),
            period,
            price,
            demand,
            brand: Some(brand.to_string()),
        }
    }

    fn selection() -> Selection {
        Selection::new("Walmart.com", "tv, television, led")
    }

    #[test]
    fn significant_product_kept_and_constant_price_excluded() {
        let cat = "TV, Television, LED";
        let mut rows = Vec::new();
        for (i, (p, q)) in [(10.0, 100.0), (10.0, 100.0), (12.0, 80.0), (12.0, 80.0)]
            .into_iter()
            .enumerate()
        {
            rows.push(obs("A", cat, i as i64 + 1, p, q, "Acme"));
        }
        for (i, q) in [40.0, 42.0, 39.0, 41.0].into_iter().enumerate() {
            rows.push(obs("B", cat, i as i64 + 1, 5.0, q, "Globex"));
        }
        let dataset = Dataset::from_observations(rows);

        let run = run_estimate(&dataset, &selection());
        assert_eq!(run.table.len(), 1);
        let a = &run.table.rows[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.brand.as_deref(), Some("Acme"));
        assert!((a.slope + 10.0).abs() < 1e-8);
        assert!((a.intercept - 200.0).abs() < 1e-6);
        assert!((a.price_elasticity - (-10.0 * 11.0 / 90.0)).abs() < 1e-9);
        assert_eq!(
            run.skipped,
            vec![SkippedProduct {
                name: "B".to_string(),
                reason: SkipReason::DegenerateFit
            }]
        );
    }

    #[test]
    fn insignificant_product_is_excluded_entirely() {
        let rows: Vec<Observation> = [90.0, 85.0, 90.0, 70.0, 70.0]
            .into_iter()
            .enumerate()
            .map(|(i, q)| obs("C", "tv, television, led", i as i64, 10.0 + i as f64, q, "Acme"))
            .collect();
        let run = run_estimate(&Dataset::from_observations(rows), &selection());
        assert!(run.table.is_empty());
        assert!(run.presented.is_empty());
        assert!(matches!(
            run.skipped[0].reason,
            SkipReason::InsignificantFit { .. }
        ));
    }

    #[test]
    fn other_selections_are_ignored() {
        let rows = vec![
            obs("A", "car, gps, dash", 1, 1.0, 1.0, "x"),
            obs("A", "car, gps, dash", 2, 2.0, 0.5, "x"),
        ];
        let run = run_estimate(&Dataset::from_observations(rows), &selection());
        assert_eq!(run.rows_matched, 0);
        assert!(run.table.is_empty());
        assert!(run.skipped.is_empty());
    }

    #[test]
    fn every_selected_product_reaches_the_fitter() {
        // A single row still forms a one-period series; it is skipped by the fit,
        // never for lack of a series.
        let rows = vec![
            obs("Solo", "tv, television, led", 1, 10.0, 50.0, "Acme"),
            obs("Pair", "tv, television, led", 1, 10.0, 50.0, "Acme"),
            obs("Pair", "tv, television, led", 3, 12.0, 40.0, "Acme"),
        ];
        let run = run_estimate(&Dataset::from_observations(rows), &selection());
        assert_eq!(run.products_fitted, 2);
        assert_eq!(run.skipped.len(), 2);
        assert!(run.skipped.iter().all(|s| s.reason != SkipReason::EmptySeries));
    }

    #[test]
    fn cache_runs_each_selection_once() {
        let rows = vec![obs("A", "tv, television, led", 1, 1.0, 1.0, "x")];
        let dataset = Dataset::from_observations(rows);
        let mut cache = EstimateCache::new();
        let first = cache.get_or_run(&dataset, &selection()).rows_matched;
        let second = cache.get_or_run(&dataset, &selection()).rows_matched;
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }
}
