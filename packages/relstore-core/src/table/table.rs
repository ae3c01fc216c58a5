//! Row storage and primary key generation.
//!
//! Each table has:
//! - Rows in insertion order, each tagged with a store-wide handle
//! - A key high-water mark so deleted keys are never handed out again

use std::collections::HashSet;

use crate::error::{DbError, Result};
use crate::value::{Row, Value};

/// Opaque identity of a stored row.
///
/// Handles are allocated by the store and never reused, so a handle held
/// by a dataset view always denotes the same logical row instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(pub(crate) u64);

impl RowHandle {
    /// Returns the raw handle value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A row together with its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Row identity
    pub handle: RowHandle,
    /// Field values
    pub values: Row,
}

/// Rows of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name
    pub name: String,
    /// Rows in insertion order
    rows: Vec<StoredRow>,
    /// Largest primary key ever assigned or inserted
    last_key: i64,
}

impl Table {
    /// Creates an empty table with room for `capacity` rows.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            rows: Vec::with_capacity(capacity),
            last_key: 0,
        }
    }

    /// Returns the number of rows.
    pub fn record_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &StoredRow> {
        self.rows.iter()
    }

    /// Returns the key high-water mark.
    pub fn last_key(&self) -> i64 {
        self.last_key
    }

    /// Returns the key the next auto-assigned insert would receive.
    ///
    /// This is one past the larger of the greatest key present and the
    /// high-water mark; with no deletions that is `max(existing, 0) + 1`.
    ///
    /// # Errors
    /// `KeySpaceExhausted` once a key of `i64::MAX` has been used.
    pub fn next_key(&self, primary_key: &str) -> Result<i64> {
        let max_existing = self
            .rows
            .iter()
            .filter_map(|r| r.values.get(primary_key).and_then(Value::as_i64))
            .max()
            .unwrap_or(0);
        max_existing
            .max(self.last_key)
            .checked_add(1)
            .ok_or_else(|| DbError::KeySpaceExhausted {
                table: self.name.clone(),
            })
    }

    /// Returns whether any row holds `key` in the primary key column.
    pub fn contains_key(&self, primary_key: &str, key: i64) -> bool {
        self.rows
            .iter()
            .any(|r| r.values.get(primary_key).and_then(Value::as_i64) == Some(key))
    }

    /// Appends a row, assigning a primary key when the row has none.
    ///
    /// # Returns
    /// The row's primary key, or `None` for tables without one.
    pub fn insert(
        &mut self,
        handle: RowHandle,
        mut values: Row,
        primary_key: Option<&str>,
    ) -> Result<Option<i64>> {
        let Some(pk) = primary_key else {
            self.rows.push(StoredRow { handle, values });
            return Ok(None);
        };

        let key = match values.get(pk) {
            None | Some(Value::Null) => {
                let key = self.next_key(pk)?;
                if values.contains_key(pk) {
                    values.insert(pk.to_string(), Value::Integer(key));
                } else {
                    values.shift_insert(0, pk.to_string(), Value::Integer(key));
                }
                key
            }
            Some(Value::Integer(key)) => {
                if self.contains_key(pk, *key) {
                    return Err(DbError::DuplicateKey {
                        table: self.name.clone(),
                        key: *key,
                    });
                }
                *key
            }
            Some(other) => {
                return Err(DbError::TypeMismatch {
                    field: pk.to_string(),
                    expected: "integer".to_string(),
                    got: other.type_name().to_string(),
                })
            }
        };

        self.last_key = self.last_key.max(key);
        self.rows.push(StoredRow { handle, values });
        Ok(Some(key))
    }

    /// Finds the row with the given handle.
    pub fn get(&self, handle: RowHandle) -> Option<&StoredRow> {
        self.rows.iter().find(|r| r.handle == handle)
    }

    /// Merges `values` into every row whose handle is in `targets`.
    ///
    /// # Returns
    /// Number of rows mutated.
    pub fn merge_into(&mut self, targets: &HashSet<RowHandle>, values: &Row) -> usize {
        let mut count = 0;
        for row in self.rows.iter_mut().filter(|r| targets.contains(&r.handle)) {
            for (field, value) in values {
                row.values.insert(field.clone(), value.clone());
            }
            count += 1;
        }
        count
    }

    /// Removes every row whose handle is in `targets`.
    ///
    /// # Returns
    /// Number of rows removed.
    pub fn remove(&mut self, targets: &HashSet<RowHandle>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|r| !targets.contains(&r.handle));
        before - self.rows.len()
    }

    /// Removes all rows. The key high-water mark is kept.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Raises the high-water mark to at least `key`.
    pub(crate) fn observe_key(&mut self, key: i64) {
        self.last_key = self.last_key.max(key);
    }
}
