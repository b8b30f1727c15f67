//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result exports (CSV/JSON) (`export`)
//! - persistent product catalog (`catalog`)

pub mod catalog;
pub mod export;
pub mod ingest;

pub use catalog::*;
pub use export::*;
pub use ingest::*;
