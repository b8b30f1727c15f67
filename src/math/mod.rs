//! Mathematical utilities: least squares with regression diagnostics.

pub mod ols;

pub use ols::*;
