//! Chainable read/write views over one table.
//!
//! A dataset is bound to a table and, once filtered or ordered, to a list of
//! row handles. Two rules govern what callers see:
//!
//! - Reads (`all`, `first`, `pluck`, ...) return owned copies. Mutating a
//!   returned row never touches the store.
//! - Writes (`update`, `delete`) act on the rows the view refers to by
//!   identity, in place, so every other view over the same rows observes
//!   the change.
//!
//! A view that outlives some of its rows simply skips the ones that were
//! deleted.

mod criteria;

pub use criteria::Criteria;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{DbError, Result};
use crate::store::{Store, StoreState};
use crate::table::{RowHandle, StoredRow};
use crate::value::{Row, Value};

/// View over a table, optionally narrowed to a subset of its rows.
#[derive(Debug, Clone)]
pub struct Dataset {
    store: Store,
    table: String,
    /// Selected rows in view order; `None` means every row in table order
    view: Option<Vec<RowHandle>>,
}

impl Dataset {
    pub(crate) fn new(store: Store, table: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            view: None,
        }
    }

    /// Name of the table this dataset reads.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns whether the view has been narrowed or reordered.
    pub fn is_filtered(&self) -> bool {
        self.view.is_some()
    }

    /// Resolves the view to stored rows, in view order.
    fn resolve<'s>(&self, state: &'s StoreState) -> Result<Vec<&'s StoredRow>> {
        state.schema(&self.table)?;
        let table = state.table(&self.table)?;
        let rows = match &self.view {
            None => table.rows().collect(),
            Some(handles) => {
                let by_handle: HashMap<RowHandle, &StoredRow> =
                    table.rows().map(|r| (r.handle, r)).collect();
                handles
                    .iter()
                    .filter_map(|h| by_handle.get(h).copied())
                    .collect()
            }
        };
        Ok(rows)
    }

    fn require_columns<'a>(
        &self,
        state: &StoreState,
        fields: impl IntoIterator<Item = &'a String>,
    ) -> Result<()> {
        let schema = state.schema(&self.table)?;
        for field in fields {
            schema.require_column(field)?;
        }
        Ok(())
    }

    fn narrowed(&self, view: Vec<RowHandle>) -> Dataset {
        Dataset {
            store: self.store.clone(),
            table: self.table.clone(),
            view: Some(view),
        }
    }

    /// Returns copies of every row in the view.
    pub fn all(&self) -> Result<Vec<Row>> {
        self.store.read(|state| {
            Ok(self
                .resolve(state)?
                .into_iter()
                .map(|r| r.values.clone())
                .collect())
        })
    }

    /// Returns a copy of the first row in the view.
    pub fn first(&self) -> Result<Option<Row>> {
        self.store.read(|state| {
            Ok(self
                .resolve(state)?
                .first()
                .map(|r| r.values.clone()))
        })
    }

    /// Number of rows in the view.
    pub fn count(&self) -> Result<usize> {
        self.store.read(|state| Ok(self.resolve(state)?.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// Inserts a row into the backing table.
    ///
    /// A row without a primary key value gets the next key for the table.
    /// Inserting through a filtered view still appends to the backing table;
    /// the view itself is unchanged.
    ///
    /// # Returns
    /// The row's primary key, or `None` if the table has no primary key.
    pub fn insert(&self, values: Row) -> Result<Option<i64>> {
        self.store.write(|state| {
            self.require_columns(state, values.keys())?;
            let primary_key = state
                .schema(&self.table)?
                .primary_key()
                .map(|c| c.name.clone());
            let handle = state.allocate_handle();
            let key = state
                .table_mut(&self.table)?
                .insert(handle, values, primary_key.as_deref())?;
            debug!(table = %self.table, ?key, "inserted row");
            Ok(key)
        })
    }

    /// Narrows the view to rows matching `criteria`.
    ///
    /// The new view refers to the same rows; nothing is copied.
    pub fn filter(&self, criteria: impl Into<Criteria>) -> Result<Dataset> {
        let criteria = criteria.into();
        let view = self.store.read(|state| {
            if let Criteria::Eq(fields) = &criteria {
                self.require_columns(state, fields.keys())?;
            }
            Ok(self
                .resolve(state)?
                .into_iter()
                .filter(|r| criteria.matches(&r.values))
                .map(|r| r.handle)
                .collect())
        })?;
        Ok(self.narrowed(view))
    }

    /// Returns a view with rows stable-sorted ascending by `column`.
    pub fn order_by(&self, column: &str) -> Result<Dataset> {
        let view = self.store.read(|state| {
            state.schema(&self.table)?.require_column(column)?;
            let mut rows = self.resolve(state)?;
            rows.sort_by(|a, b| {
                let left = a.values.get(column).unwrap_or(&Value::Null);
                let right = b.values.get(column).unwrap_or(&Value::Null);
                left.sort_cmp(right)
            });
            Ok(rows.into_iter().map(|r| r.handle).collect())
        })?;
        Ok(self.narrowed(view))
    }

    /// Returns the value of `column` for every row in the view.
    pub fn pluck(&self, column: &str) -> Result<Vec<Value>> {
        self.store.read(|state| {
            state.schema(&self.table)?.require_column(column)?;
            Ok(self
                .resolve(state)?
                .into_iter()
                .map(|r| r.values.get(column).cloned().unwrap_or_default())
                .collect())
        })
    }

    /// Counts rows per distinct value of `column`, in first-seen order.
    pub fn group_and_count(&self, column: &str) -> Result<Vec<(Value, usize)>> {
        let values = self.pluck(column)?;
        let mut groups: Vec<(Value, usize)> = Vec::new();
        for value in values {
            match groups.iter_mut().find(|(seen, _)| *seen == value) {
                Some((_, count)) => *count += 1,
                None => groups.push((value, 1)),
            }
        }
        Ok(groups)
    }

    /// Merges `values` into every row of the view, in place.
    ///
    /// Setting the primary key is allowed as long as keys stay unique.
    ///
    /// # Returns
    /// Number of rows mutated.
    pub fn update(&self, values: Row) -> Result<usize> {
        self.store.write(|state| {
            self.require_columns(state, values.keys())?;
            let targets: HashSet<RowHandle> =
                self.resolve(state)?.into_iter().map(|r| r.handle).collect();
            if targets.is_empty() {
                return Ok(0);
            }

            let new_key = self.check_key_change(state, &targets, &values)?;
            let table = state.table_mut(&self.table)?;
            let count = table.merge_into(&targets, &values);
            if let Some(key) = new_key {
                table.observe_key(key);
            }
            debug!(table = %self.table, count, "updated rows");
            Ok(count)
        })
    }

    /// Validates a primary key assignment in `values` against the other rows.
    fn check_key_change(
        &self,
        state: &StoreState,
        targets: &HashSet<RowHandle>,
        values: &Row,
    ) -> Result<Option<i64>> {
        let schema = state.schema(&self.table)?;
        let Some(pk) = schema.primary_key() else {
            return Ok(None);
        };
        let Some(value) = values.get(&pk.name) else {
            return Ok(None);
        };
        let key = value.as_i64().ok_or_else(|| DbError::TypeMismatch {
            field: pk.name.clone(),
            expected: "integer".to_string(),
            got: value.type_name().to_string(),
        })?;

        let taken_elsewhere = state
            .table(&self.table)?
            .rows()
            .filter(|r| !targets.contains(&r.handle))
            .any(|r| r.values.get(&pk.name) == Some(value));
        if targets.len() > 1 || taken_elsewhere {
            return Err(DbError::DuplicateKey {
                table: self.table.clone(),
                key,
            });
        }
        Ok(Some(key))
    }

    /// Removes every row of the view from the backing table.
    ///
    /// # Returns
    /// Number of rows removed.
    pub fn delete(&self) -> Result<usize> {
        self.store.write(|state| {
            let targets: HashSet<RowHandle> =
                self.resolve(state)?.into_iter().map(|r| r.handle).collect();
            if targets.is_empty() {
                return Ok(0);
            }
            let removed = state.table_mut(&self.table)?.remove(&targets);
            debug!(table = %self.table, removed, "deleted rows");
            Ok(removed)
        })
    }
}
