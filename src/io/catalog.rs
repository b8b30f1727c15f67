//! Persistent product catalog.
//!
//! A JSON file holding `ProductRecord`s keyed by product name, plus the time of
//! the last load. Loading a fixture only ever inserts: names already present are
//! reported and skipped, never updated or removed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::ProductRecord;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogStore {
    pub loaded_at: Option<DateTime<Utc>>,
    pub products: BTreeMap<String, ProductRecord>,
}

/// Outcome of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub inserted: usize,
    /// Names that were already in the store.
    pub skipped: Vec<String>,
}

impl CatalogStore {
    /// Open a store; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(AppError::new(
                    2,
                    format!("Failed to open catalog '{}': {e}", path.display()),
                ));
            }
        };
        serde_json::from_reader(file)
            .map_err(|e| AppError::new(2, format!("Invalid catalog JSON '{}': {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::new(4, format!("Failed to create catalog dir '{}': {e}", parent.display()))
            })?;
        }
        let file = File::create(path)
            .map_err(|e| AppError::new(4, format!("Failed to create catalog '{}': {e}", path.display())))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| AppError::new(4, format!("Failed to write catalog: {e}")))
    }

    /// Insert records whose names are not yet stored.
    pub fn insert_new(&mut self, records: Vec<ProductRecord>) -> LoadSummary {
        let mut summary = LoadSummary::default();
        for record in records {
            if self.products.contains_key(&record.name) {
                warn!(product = %record.name, "catalog already has product, skipping");
                summary.skipped.push(record.name);
                continue;
            }
            self.products.insert(record.name.clone(), record);
            summary.inserted += 1;
        }
        self.loaded_at = Some(Utc::now());
        summary
    }

    pub fn get(&self, name: &str) -> Option<&ProductRecord> {
        self.products.get(name)
    }

    /// Records in name order.
    pub fn list(&self) -> impl Iterator<Item = &ProductRecord> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Read a fixture: a JSON array of product records.
pub fn read_fixture(path: &Path) -> Result<Vec<ProductRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fixture '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid fixture JSON '{}': {e}", path.display())))
}

/// Load `fixture` into the store at `store_path` (created if missing).
pub fn bulk_load(fixture: &Path, store_path: &Path) -> Result<LoadSummary, AppError> {
    let records = read_fixture(fixture)?;
    let mut store = CatalogStore::open(store_path)?;
    let summary = store.insert_new(records);
    store.save(store_path)?;

    info!(
        store = %store_path.display(),
        inserted = summary.inserted,
        skipped = summary.skipped.len(),
        "loaded catalog fixture"
    );
    Ok(summary)
}
