//! Per-product price elasticity estimation.
//!
//! For one `ProductSeries` we regress demand on price,
//!
//! ```text
//! demand_i = intercept + slope * price_i + ε_i
//! ```
//!
//! keep the product only if the model F-test p-value is below 5%, and derive
//!
//! ```text
//! elasticity = slope * (mean_price / mean_demand)
//! ```

use nalgebra::DVector;
use tracing::debug;

use crate::domain::{FitResult, ProductSeries};
use crate::error::SkipReason;
use crate::math::{add_constant, fit_ols, OlsFit};

/// Significance gate for the model F-test.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Shape of the fitted parameter set.
///
/// Extraction only succeeds when the design had both an intercept and a price
/// column; anything else is `Degenerate` and the product is skipped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitOutcome {
    Fitted {
        intercept: f64,
        slope: f64,
        t_score: f64,
    },
    Degenerate,
}

impl FitOutcome {
    pub fn from_ols(fit: &OlsFit) -> Self {
        if fit.rank < 2 {
            return FitOutcome::Degenerate;
        }
        match (fit.params.as_slice(), fit.tvalues.as_slice()) {
            (&[intercept, slope], &[_, t_score]) => FitOutcome::Fitted {
                intercept,
                slope,
                t_score,
            },
            _ => FitOutcome::Degenerate,
        }
    }
}

/// Round a p-value up at the third decimal (0.03201 → 0.033, 0.030 → 0.030).
pub fn ceil_pvalue(p: f64) -> f64 {
    (p * 1000.0).ceil() / 1000.0
}

/// Arithmetic mean; `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Estimate elasticity for one product, or say why it was skipped.
pub fn fit_product(series: &ProductSeries) -> Result<FitResult, SkipReason> {
    if series.is_empty() {
        return Err(SkipReason::EmptySeries);
    }

    let x = add_constant(&series.prices);
    if x.ncols() < 2 {
        debug!(product = %series.name, "constant price series; no slope to estimate");
        return Err(SkipReason::DegenerateFit);
    }
    let y = DVector::from_column_slice(&series.demand);
    let Some(ols) = fit_ols(&x, &y, true) else {
        return Err(SkipReason::DegenerateFit);
    };

    // NaN p-values (no residual dof, no demand variance) fail this comparison too.
    if !(ols.f_pvalue < SIGNIFICANCE_LEVEL) {
        return Err(SkipReason::InsignificantFit {
            p_value: ols.f_pvalue,
        });
    }

    let FitOutcome::Fitted {
        intercept,
        slope,
        t_score,
    } = FitOutcome::from_ols(&ols)
    else {
        return Err(SkipReason::DegenerateFit);
    };

    let price_mean = mean(&series.prices);
    let quantity_mean = mean(&series.demand);
    let price_elasticity = slope * (price_mean / quantity_mean);
    if !price_elasticity.is_finite() {
        return Err(SkipReason::UndefinedElasticity);
    }

    Ok(FitResult {
        name: series.name.clone(),
        intercept,
        slope,
        t_score,
        price_mean,
        quantity_mean,
        rsquared: ols.rsquared,
        f_pvalue: ols.f_pvalue,
        coefficient_pvalue: ceil_pvalue(ols.f_pvalue),
        price_elasticity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(name: &str, prices: &[f64], demand: &[f64]) -> ProductSeries {
        ProductSeries {
            name: name.to_string(),
            periods: (1..=prices.len() as i64).collect(),
            prices: prices.to_vec(),
            demand: demand.to_vec(),
        }
    }

    #[test]
    fn significant_negative_slope_is_retained() {
        let s = series(
            "A",
            &[10.0, 11.0, 12.0, 13.0, 14.0],
            &[100.0, 92.0, 85.0, 76.0, 70.0],
        );
        let fit = fit_product(&s).unwrap();

        assert!((fit.intercept - 175.8).abs() < 1e-8);
        assert!((fit.slope + 7.6).abs() < 1e-9);
        assert!((fit.price_mean - 12.0).abs() < 1e-12);
        assert!((fit.quantity_mean - 84.6).abs() < 1e-12);
        assert!((fit.rsquared - 0.997_237_569_060_773_5).abs() < 1e-9);
        assert!((fit.t_score + 32.908_965_343_808_78).abs() < 1e-6);
        assert!((fit.f_pvalue - 6.167_175e-5).abs() < 1e-8);
        assert_eq!(fit.coefficient_pvalue, 0.001);
        assert!((fit.price_elasticity + 1.078_014_184_397_163).abs() < 1e-9);
    }

    #[test]
    fn elasticity_is_slope_times_mean_ratio() {
        let s = series(
            "A",
            &[3.0, 4.0, 4.5, 5.0, 6.0, 6.5],
            &[40.0, 35.0, 33.0, 29.0, 24.0, 22.0],
        );
        let fit = fit_product(&s).unwrap();
        let expected = fit.slope * (fit.price_mean / fit.quantity_mean);
        assert!((fit.price_elasticity - expected).abs() < 1e-12);
    }

    #[test]
    fn constant_price_is_degenerate() {
        let s = series("B", &[5.0, 5.0, 5.0, 5.0], &[10.0, 12.0, 9.0, 11.0]);
        assert_eq!(fit_product(&s).unwrap_err(), SkipReason::DegenerateFit);
    }

    #[test]
    fn p_value_above_gate_is_excluded() {
        // p ≈ 0.069
        let s = series(
            "C",
            &[10.0, 11.0, 12.0, 13.0, 14.0],
            &[90.0, 85.0, 90.0, 70.0, 70.0],
        );
        match fit_product(&s).unwrap_err() {
            SkipReason::InsignificantFit { p_value } => {
                assert!((p_value - 0.069_042).abs() < 1e-5);
            }
            other => panic!("unexpected skip reason: {other:?}"),
        }
    }

    #[test]
    fn zero_demand_is_not_significant() {
        let s = series("D", &[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]);
        assert!(matches!(
            fit_product(&s).unwrap_err(),
            SkipReason::InsignificantFit { .. }
        ));
    }

    #[test]
    fn two_periods_cannot_be_tested() {
        let s = series("E", &[1.0, 2.0], &[10.0, 8.0]);
        assert!(matches!(
            fit_product(&s).unwrap_err(),
            SkipReason::InsignificantFit { .. }
        ));
    }

    #[test]
    fn empty_series_is_reported() {
        let s = series("F", &[], &[]);
        assert_eq!(fit_product(&s).unwrap_err(), SkipReason::EmptySeries);
    }

    #[test]
    fn single_parameter_outcome_is_degenerate() {
        let x = add_constant(&[2.0, 2.0, 2.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        let ols = fit_ols(&x, &y, true).unwrap();
        assert_eq!(FitOutcome::from_ols(&ols), FitOutcome::Degenerate);
    }

    #[test]
    fn ceil_pvalue_rounds_up_at_third_decimal() {
        assert_eq!(ceil_pvalue(0.03201), 0.033);
        assert_eq!(ceil_pvalue(0.030), 0.030);
        assert_eq!(ceil_pvalue(0.0), 0.0);
        for &p in &[0.000_01, 0.012_345, 0.049_999, 0.031, 0.2] {
            let c = ceil_pvalue(p);
            assert!(c >= p, "{c} < {p}");
            assert!(c - p < 0.001, "{c} too far from {p}");
        }
    }
}
