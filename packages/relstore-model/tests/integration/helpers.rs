//! Shared seeded catalog and per-test isolation.

use std::path::PathBuf;
use std::sync::OnceLock;

use chrono::NaiveDate;
use relstore_core::Store;
use relstore_model::{Bookstore, Model, ModelError};

static CATALOG: OnceLock<Bookstore> = OnceLock::new();

pub fn seed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/seed")
}

/// Catalog loaded from the repository seed files, built once.
pub fn catalog() -> &'static Bookstore {
    CATALOG.get_or_init(|| {
        let store = Store::new();
        let (catalog, report) = Bookstore::open(&store, seed_dir()).unwrap();
        assert!(report.skipped.is_empty(), "missing seed files: {:?}", report.skipped);
        catalog
    })
}

/// Runs `test` against the shared catalog and rolls back everything it did.
pub fn isolated(test: impl FnOnce(&Bookstore) -> Result<(), ModelError>) {
    let catalog = catalog();
    catalog
        .registry
        .store()
        .isolated(|_| test(catalog))
        .unwrap();
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// String form of a model field.
pub fn text(model: &Model, field: &str) -> String {
    model.get(field).to_string()
}
