//! Elasticity charts: SVG artifact, terminal widget drawing, and ASCII bars.

pub mod ascii;
pub mod chart;

pub use ascii::*;
pub use chart::*;
