//! Data sources beyond the user's CSV export.

pub mod sample;

pub use sample::*;
