//! Elasticity fitting.
//!
//! Responsibilities:
//!
//! - regress demand on price per product
//! - gate on the F-test p-value
//! - derive the elasticity coefficient

pub mod elasticity;

pub use elasticity::*;
