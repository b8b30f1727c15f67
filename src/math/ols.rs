//! Ordinary least squares with regression diagnostics.
//!
//! We solve small problems of the form
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! and report the quantities a regression summary would: parameters, standard
//! errors, t-values, R², and the overall F-test.
//!
//! Implementation choices:
//! - SVD gives both the least-squares solution and the numerical rank, so a
//!   rank-deficient design is detected instead of producing garbage.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The first column is assumed to be the constant when `has_constant` is set;
//!   `df_model` excludes it.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Relative singular value cutoff used for rank detection.
const RANK_EPS: f64 = 1e-10;

/// Fitted OLS model.
#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: Vec<f64>,
    pub bse: Vec<f64>,
    pub tvalues: Vec<f64>,
    pub rank: usize,
    pub nobs: usize,
    pub df_model: f64,
    pub df_resid: f64,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Centered total sum of squares.
    pub centered_tss: f64,
    pub rsquared: f64,
    pub fvalue: f64,
    /// `NaN` when the F-test is undefined (no residual or model degrees of freedom).
    pub f_pvalue: f64,
}

/// Prepend a constant column to a single regressor.
///
/// Mirrors the usual "add constant unless one is already there" rule: when the
/// regressor itself is constant the design stays single-column.
pub fn add_constant(x: &[f64]) -> DMatrix<f64> {
    let constant = x.windows(2).all(|w| w[0] == w[1]);
    if constant {
        return DMatrix::from_column_slice(x.len(), 1, x);
    }
    DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { 1.0 } else { x[i] })
}

/// Fit `y = X β + ε` by OLS.
///
/// Returns `None` for shape mismatches, empty input, or a zero-rank design.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>, has_constant: bool) -> Option<OlsFit> {
    let n = x.nrows();
    let k = x.ncols();
    if n == 0 || k == 0 || y.len() != n {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let max_sv = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let rank = svd.rank(max_sv * RANK_EPS * n.max(k) as f64);
    if rank == 0 {
        return None;
    }
    let beta = svd.solve(y, max_sv * RANK_EPS).ok()?;
    if !beta.iter().all(|v| v.is_finite()) {
        return None;
    }

    let resid = y - x * &beta;
    let ssr = resid.dot(&resid);
    let y_mean = y.mean();
    let centered_tss = y.iter().map(|v| (v - y_mean).powi(2)).sum::<f64>();

    let k_constant = if has_constant { 1.0 } else { 0.0 };
    let df_model = rank as f64 - k_constant;
    let df_resid = n as f64 - rank as f64;

    let rsquared = 1.0 - ssr / centered_tss;
    let ess = centered_tss - ssr;
    let scale = ssr / df_resid;
    let fvalue = (ess / df_model) / scale;
    let f_pvalue = f_survival(fvalue, df_model, df_resid);

    // Cov(β) = σ² (XᵀX)⁺
    let xtx = x.transpose() * x;
    let xtx_pinv = xtx.pseudo_inverse(RANK_EPS).ok()?;
    let bse: Vec<f64> = (0..k).map(|j| (xtx_pinv[(j, j)] * scale).sqrt()).collect();
    let tvalues: Vec<f64> = beta.iter().zip(&bse).map(|(b, se)| b / se).collect();

    Some(OlsFit {
        params: beta.iter().copied().collect(),
        bse,
        tvalues,
        rank,
        nobs: n,
        df_model,
        df_resid,
        ssr,
        centered_tss,
        rsquared,
        fvalue,
        f_pvalue,
    })
}

/// Upper-tail probability of `F(d1, d2)` at `f`.
fn f_survival(f: f64, d1: f64, d2: f64) -> f64 {
    if !(d1 > 0.0 && d2 > 0.0) || f.is_nan() {
        return f64::NAN;
    }
    if f == f64::INFINITY {
        return 0.0;
    }
    if f <= 0.0 {
        return 1.0;
    }
    match FisherSnedecor::new(d1, d2) {
        Ok(dist) => dist.sf(f),
        Err(_) => f64::NAN,
    }
}
