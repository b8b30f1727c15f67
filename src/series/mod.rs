//! Series building: aggregation, pivot, and forward-fill gap handling.

pub mod builder;

pub use builder::*;
