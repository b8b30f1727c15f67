//! Runtime settings.
//!
//! Resolution order: `.env` file (via `dotenvy`), process environment, then
//! command-line overrides applied by the caller.
//!
//! | variable               | default        |
//! |------------------------|----------------|
//! | `ELASTICITY_DATA`      | (none)         |
//! | `ELASTICITY_MEDIA_DIR` | `media`        |
//! | `ELASTICITY_MEDIA_URL` | `/media/`      |
//! | `ELASTICITY_MERCHANTS` | built-in list  |
//! | `ELASTICITY_CATALOG`   | `catalog.json` |

use std::path::PathBuf;

use tracing::debug;

use crate::domain::MerchantCatalog;
use crate::error::AppError;

pub const ENV_DATA: &str = "ELASTICITY_DATA";
pub const ENV_MEDIA_DIR: &str = "ELASTICITY_MEDIA_DIR";
pub const ENV_MEDIA_URL: &str = "ELASTICITY_MEDIA_URL";
pub const ENV_MERCHANTS: &str = "ELASTICITY_MERCHANTS";
pub const ENV_CATALOG: &str = "ELASTICITY_CATALOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Observation CSV.
    pub data: Option<PathBuf>,
    /// Directory the chart is written to.
    pub media_dir: PathBuf,
    /// URL prefix the media directory is served under.
    pub media_url: String,
    /// Merchant enumeration JSON; `None` uses the built-in list.
    pub merchants: Option<PathBuf>,
    /// Product catalog store.
    pub catalog: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data: None,
            media_dir: PathBuf::from("media"),
            media_url: "/media/".to_string(),
            merchants: None,
            catalog: PathBuf::from("catalog.json"),
        }
    }
}

impl Settings {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let settings = Self {
            data: get(ENV_DATA).map(PathBuf::from),
            media_dir: get(ENV_MEDIA_DIR).map(PathBuf::from).unwrap_or(defaults.media_dir),
            media_url: get(ENV_MEDIA_URL).unwrap_or(defaults.media_url),
            merchants: get(ENV_MERCHANTS).map(PathBuf::from),
            catalog: get(ENV_CATALOG).map(PathBuf::from).unwrap_or(defaults.catalog),
        };
        debug!(?settings, "resolved settings");
        settings
    }

    /// The observation CSV, or a usage error naming the variable to set.
    pub fn data_path(&self) -> Result<&PathBuf, AppError> {
        self.data.as_ref().ok_or_else(|| {
            AppError::new(
                2,
                format!("No observation data configured. Pass --data or set {ENV_DATA}."),
            )
        })
    }

    /// The merchant enumeration: the configured JSON file or the built-in list.
    pub fn merchant_catalog(&self) -> Result<MerchantCatalog, AppError> {
        match &self.merchants {
            Some(path) => MerchantCatalog::from_json_file(path),
            None => Ok(MerchantCatalog::default()),
        }
    }
}
