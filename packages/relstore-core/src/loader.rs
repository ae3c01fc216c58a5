//! Bulk loading of JSON seed files.
//!
//! Seed data lives in one file per table, `<dir>/<table>.json`, each holding
//! a JSON array of objects. Loading a table replaces its rows.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{DbError, Result};
use crate::store::Store;
use crate::value::{Row, Value};

/// Record as read from a seed file.
pub type JsonRecord = serde_json::Map<String, serde_json::Value>;

/// Rows loaded per table, in load order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub tables: Vec<(String, usize)>,
    /// Tables whose seed file did not exist
    pub skipped: Vec<String>,
}

impl LoadReport {
    /// Total number of rows inserted.
    pub fn total(&self) -> usize {
        self.tables.iter().map(|(_, n)| n).sum()
    }

    /// Rows inserted into `table`, if it was loaded.
    pub fn count(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, n)| *n)
    }
}

/// Loads records into tables of a store.
#[derive(Debug)]
pub struct BulkLoader<'a> {
    store: &'a Store,
}

impl<'a> BulkLoader<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Replaces every row of `table` with `records`.
    ///
    /// Field names are trimmed and lowercased, and each value is converted
    /// to its column's type. Two names in one record that canonicalize to
    /// the same field fail with `FieldAlreadyExists`. The load is
    /// all-or-nothing.
    ///
    /// # Returns
    /// Number of rows inserted.
    pub fn load_records(
        &self,
        table: &str,
        records: impl IntoIterator<Item = JsonRecord>,
    ) -> Result<usize> {
        let inserted = self.store.transaction(|store| {
            let schema = store.schema_of(table)?;
            store.clear_table(table)?;

            let dataset = store.dataset(table);
            let mut inserted = 0;
            for record in records {
                let mut row = Row::with_capacity(record.len());
                for (field, json) in &record {
                    let field = canonical_field(field);
                    if row.contains_key(&field) {
                        return Err(DbError::FieldAlreadyExists {
                            table: table.to_string(),
                            field,
                        });
                    }
                    let column = schema.require_column(&field)?;
                    let value = Value::from_json(&field, json, column.column_type)?;
                    row.insert(field, value);
                }
                dataset.insert(row)?;
                inserted += 1;
            }
            Ok::<_, DbError>(inserted)
        })?;

        let inserted = inserted.unwrap_or_default();
        debug!(table, inserted, "loaded records");
        Ok(inserted)
    }

    /// Loads `<dir>/<table>.json` for each table, in order, in one transaction.
    ///
    /// Tables without a seed file are skipped and keep their rows. A failure
    /// in any table rolls back the whole load.
    pub fn load_dir(&self, dir: impl AsRef<Path>, tables: &[impl AsRef<str>]) -> Result<LoadReport> {
        let dir = dir.as_ref();
        let report = self.store.transaction(|_| {
            let mut report = LoadReport::default();
            for table in tables {
                let table = table.as_ref();
                let path = dir.join(format!("{}.json", table));
                if !path.exists() {
                    warn!(table, path = %path.display(), "seed file missing; skipping");
                    report.skipped.push(table.to_string());
                    continue;
                }

                let records = read_records(&path)?;
                let inserted = self.load_records(table, records)?;
                report.tables.push((table.to_string(), inserted));
            }
            Ok::<_, DbError>(report)
        })?;

        let report = report.unwrap_or_default();
        info!(
            dir = %dir.display(),
            tables = report.tables.len(),
            rows = report.total(),
            skipped = report.skipped.len(),
            "seed load complete"
        );
        Ok(report)
    }
}

fn canonical_field(field: &str) -> String {
    field.trim().to_ascii_lowercase()
}

fn read_records(path: &Path) -> Result<Vec<JsonRecord>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| DbError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents).map_err(|e| {
        DbError::SerializationError(format!("Failed to parse {}: {}", path.display(), e))
    })
}
