//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - exported to JSON/CSV
//! - persisted in the product catalog and reloaded later

use serde::{Deserialize, Serialize};

/// One row of source data.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub name: String,
    pub merchant: String,
    pub category: String,
    /// Ordinal time period (week number in the source data).
    pub period: i64,
    /// Discount price; always finite and > 0 after ingest.
    pub price: f64,
    /// Impressions; always finite and >= 0 after ingest.
    pub demand: f64,
    /// Metadata for the brand merge only; a blank cell does not reject the row.
    pub brand: Option<String>,
}

/// A validated merchant/category pair.
///
/// Only `MerchantCatalog::validate` constructs these outside of tests, so holding
/// one means the pair is part of the configured enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Selection {
    pub merchant: String,
    pub category: String,
}

impl Selection {
    pub(crate) fn new(merchant: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            merchant: merchant.into(),
            category: category.into(),
        }
    }

    /// Whether an observation belongs to this selection.
    ///
    /// Merchant matches exactly; category is a case-insensitive literal
    /// substring match against the observation's category label.
    pub fn matches(&self, obs: &Observation) -> bool {
        obs.merchant == self.merchant
            && obs
                .category
                .to_lowercase()
                .contains(&self.category.to_lowercase())
    }
}

/// Aligned price/demand series of one product, ordered by period.
///
/// Every entry is fully paired: periods where either side was still missing
/// after forward-fill are not present.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSeries {
    pub name: String,
    pub periods: Vec<i64>,
    pub prices: Vec<f64>,
    pub demand: Vec<f64>,
}

impl ProductSeries {
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Per-product estimate produced by the elasticity fitter.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub name: String,
    pub intercept: f64,
    pub slope: f64,
    pub t_score: f64,
    pub price_mean: f64,
    pub quantity_mean: f64,
    pub rsquared: f64,
    /// Unrounded F-test p-value.
    pub f_pvalue: f64,
    /// F-test p-value rounded up at the third decimal.
    pub coefficient_pvalue: f64,
    pub price_elasticity: f64,
}

/// Product record schema shared by the live result table and the persisted catalog.
///
/// Field order matches the exported column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price_elasticity: f64,
    pub price_mean: f64,
    pub quantity_mean: f64,
    pub intercept: f64,
    pub t_score: f64,
    pub slope: f64,
    pub coefficient_pvalue: f64,
    pub rsquared: f64,
    /// `None` when the left merge found no brand for the name.
    #[serde(default)]
    pub brand: Option<String>,
}

impl ProductRecord {
    pub fn from_fit(fit: &FitResult, brand: Option<String>) -> Self {
        Self {
            name: fit.name.clone(),
            price_elasticity: fit.price_elasticity,
            price_mean: fit.price_mean,
            quantity_mean: fit.quantity_mean,
            intercept: fit.intercept,
            t_score: fit.t_score,
            slope: fit.slope,
            coefficient_pvalue: fit.coefficient_pvalue,
            rsquared: fit.rsquared,
            brand,
        }
    }

    /// `(label, value)` pairs for detail views, in export order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("brand", self.brand.clone().unwrap_or_default()),
            ("price_elasticity", format!("{:.6}", self.price_elasticity)),
            ("price_mean", format!("{:.4}", self.price_mean)),
            ("quantity_mean", format!("{:.4}", self.quantity_mean)),
            ("intercept", format!("{:.6}", self.intercept)),
            ("slope", format!("{:.6}", self.slope)),
            ("t_score", format!("{:.4}", self.t_score)),
            ("coefficient_pvalue", format!("{:.3}", self.coefficient_pvalue)),
            ("rsquared", format!("{:.6}", self.rsquared)),
        ]
    }
}
