//! Merchant → category enumeration and selection validation.
//!
//! The enumeration is a plain value built once at startup (built-in default or
//! a JSON file) and handed to whoever validates selections.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Selection;
use crate::error::{AppError, InvalidSelection};

/// Known merchant/category combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantCatalog {
    merchants: BTreeMap<String, Vec<String>>,
}

impl MerchantCatalog {
    pub fn new(merchants: BTreeMap<String, Vec<String>>) -> Self {
        Self { merchants }
    }

    /// Read a catalog from a JSON object `{ "merchant": ["category", ...] }`.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::new(2, format!("Failed to open merchant catalog '{}': {e}", path.display()))
        })?;
        let catalog: Self = serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid merchant catalog JSON: {e}")))?;
        if catalog.merchants.is_empty() {
            return Err(AppError::new(2, "Merchant catalog is empty."));
        }
        Ok(catalog)
    }

    pub fn merchants(&self) -> impl Iterator<Item = &str> {
        self.merchants.keys().map(String::as_str)
    }

    pub fn categories(&self, merchant: &str) -> &[String] {
        self.merchants.get(merchant).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every valid selection, merchant-major.
    pub fn selections(&self) -> Vec<Selection> {
        self.merchants
            .iter()
            .flat_map(|(m, cats)| cats.iter().map(move |c| Selection::new(m.clone(), c.clone())))
            .collect()
    }

    /// Validate a (possibly missing) merchant/category pair.
    pub fn validate(
        &self,
        merchant: Option<&str>,
        category: Option<&str>,
    ) -> Result<Selection, InvalidSelection> {
        let invalid = || InvalidSelection {
            merchant: merchant.map(str::to_string),
            category: category.map(str::to_string),
        };

        let (Some(merchant), Some(category)) = (merchant, category) else {
            return Err(invalid());
        };
        let Some(categories) = self.merchants.get(merchant) else {
            return Err(invalid());
        };
        if !categories.iter().any(|c| c == category) {
            return Err(invalid());
        }

        Ok(Selection::new(merchant, category))
    }
}

impl Default for MerchantCatalog {
    fn default() -> Self {
        let mut merchants = BTreeMap::new();
        merchants.insert(
            "bhphotovideo.com".to_string(),
            [
                "camera, mirrorless",
                "drive, storage, hard",
                "camera, shoot, point",
                "headphone, earbud, bluetooth",
                "tv, television, led",
                "camera, camcorder, action",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        merchants.insert(
            "Walmart.com".to_string(),
            ["tv, television, led", "car, gps, dash"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        Self { merchants }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_known_pair() {
        let catalog = MerchantCatalog::default();
        let sel = catalog
            .validate(Some("Walmart.com"), Some("car, gps, dash"))
            .unwrap();
        assert_eq!(sel.merchant, "Walmart.com");
        assert_eq!(sel.category, "car, gps, dash");
    }

    #[test]
    fn validate_rejects_missing_and_unknown() {
        let catalog = MerchantCatalog::default();
        assert!(catalog.validate(None, Some("car, gps, dash")).is_err());
        assert!(catalog.validate(Some("Walmart.com"), None).is_err());
        assert!(catalog.validate(Some("target.com"), Some("tv, television, led")).is_err());
        // Category exists, but not for this merchant.
        let err = catalog
            .validate(Some("Walmart.com"), Some("camera, mirrorless"))
            .unwrap_err();
        assert_eq!(err.category.as_deref(), Some("camera, mirrorless"));
    }

    #[test]
    fn selections_cover_every_pair() {
        let catalog = MerchantCatalog::default();
        assert_eq!(catalog.selections().len(), 8);
        assert_eq!(catalog.categories("Walmart.com").len(), 2);
        assert!(catalog.categories("nope").is_empty());
    }

    #[test]
    fn catalog_loads_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merchants.json");
        std::fs::write(&path, r#"{"shop.example": ["toys", "games"]}"#).unwrap();

        let catalog = MerchantCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.merchants().collect::<Vec<_>>(), vec!["shop.example"]);
        assert!(catalog.validate(Some("shop.example"), Some("games")).is_ok());
    }
}
