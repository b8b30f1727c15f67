//! Error types.
//!
//! - `AppError`: fatal, carries a process exit code (2 = input/usage,
//!   3 = no usable data, 4 = computation/IO/rendering).
//! - `SkipReason`: why one product was left out of a run. Never fatal.
//! - `InvalidSelection`: a merchant/category pair outside the enumeration.

#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

/// Per-product outcome that removes the product from the result table.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SkipReason {
    /// No period has both a price and a demand value after gap-fill.
    #[error("no paired price/demand periods")]
    EmptySeries,
    /// The design cannot yield both intercept and slope (e.g. constant price).
    #[error("degenerate regression (intercept/slope not identifiable)")]
    DegenerateFit,
    /// F-test p-value at or above the 5% gate (or undefined).
    #[error("not significant (p={p_value:.4})")]
    InsignificantFit { p_value: f64 },
    /// Mean demand is zero, so `slope * mean_price / mean_demand` is not finite.
    #[error("elasticity undefined (zero mean demand)")]
    UndefinedElasticity,
}

/// A selection that is not part of the merchant enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please select both a valid merchant and category.")]
pub struct InvalidSelection {
    pub merchant: Option<String>,
    pub category: Option<String>,
}

impl From<InvalidSelection> for AppError {
    fn from(err: InvalidSelection) -> Self {
        AppError::new(
            2,
            format!(
                "{err} (merchant={}, category={}; see `elast merchants`)",
                err.merchant.as_deref().unwrap_or("-"),
                err.category.as_deref().unwrap_or("-"),
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_selection_maps_to_usage_exit_code() {
        let err = InvalidSelection {
            merchant: Some("nowhere.com".to_string()),
            category: None,
        };
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), 2);
        assert!(app.to_string().starts_with("Please select both a valid merchant and category."));
        assert!(app.to_string().contains("nowhere.com"));
    }

    #[test]
    fn skip_reason_messages_are_readable() {
        let s = SkipReason::InsignificantFit { p_value: 0.0712 }.to_string();
        assert_eq!(s, "not significant (p=0.0712)");
    }
}
