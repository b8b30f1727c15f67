//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw source rows (`Observation`) and validated selections (`Selection`)
//! - per-product aligned series (`ProductSeries`)
//! - fit outputs (`FitResult`) and the shared record schema (`ProductRecord`)
//! - the merchant/category enumeration (`MerchantCatalog`)

pub mod merchants;
pub mod types;

pub use merchants::*;
pub use types::*;
