//! Reporting utilities: result assembly, presentation selection, and formatting.
//!
//! - `assemble`: retained fits + brand left-merge → `ResultTable`
//! - `present`: outlier filter + ascending sort → the view front-ends consume
//! - `format`: terminal tables and summaries

use std::collections::HashMap;

use crate::domain::{FitResult, Observation, ProductRecord};

pub mod format;

pub use format::*;

/// Elasticities beyond this magnitude are treated as noise and never presented.
pub const MAX_ABS_ELASTICITY: f64 = 50.0;

/// Retained per-product estimates, one row per product, ordered by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub rows: Vec<ProductRecord>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ProductRecord> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// First brand seen for every product name, in source row order.
///
/// Conflicting brands for one name are resolved in favour of the first row that
/// has one; rows with a blank brand are passed over.
pub fn brand_mapping(observations: &[Observation]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for obs in observations {
        if let Some(brand) = &obs.brand {
            map.entry(obs.name.clone()).or_insert_with(|| brand.clone());
        }
    }
    map
}

/// Collect fits into a table and left-merge brands from the raw observations.
pub fn assemble(fits: &[FitResult], observations: &[Observation]) -> ResultTable {
    let brands = brand_mapping(observations);
    let mut rows: Vec<ProductRecord> = fits
        .iter()
        .map(|fit| ProductRecord::from_fit(fit, brands.get(&fit.name).cloned()))
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    ResultTable { rows }
}

/// Drop outliers (`|elasticity| > 50`) and sort ascending by elasticity.
pub fn present(table: &ResultTable) -> Vec<ProductRecord> {
    let mut rows: Vec<ProductRecord> = table
        .rows
        .iter()
        .filter(|r| r.price_elasticity.is_finite() && r.price_elasticity.abs() <= MAX_ABS_ELASTICITY)
        .cloned()
        .collect();
    // Stable: ties keep name order.
    rows.sort_by(|a, b| a.price_elasticity.total_cmp(&b.price_elasticity));
    rows
}

/// Detail lookup within the presented view.
pub fn find_presented<'a>(presented: &'a [ProductRecord], name: &str) -> Option<&'a ProductRecord> {
    presented.iter().find(|r| r.name == name)
}

#[cfg(test)]
pub(crate) fn record(name: &str, elasticity: f64) -> ProductRecord {
    ProductRecord {
        name: name.to_string(),
        price_elasticity: elasticity,
        price_mean: 10.0,
        quantity_mean: 100.0,
        intercept: 150.0,
        t_score: -4.0,
        slope: elasticity * 10.0,
        coefficient_pvalue: 0.01,
        rsquared: 0.8,
        brand: Some("Acme".to_string()),
    }
}
