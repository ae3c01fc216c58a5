//! Store handle owning every table's schema and rows.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::ReentrantMutex;
use serde::Serialize;
use tracing::debug;

use crate::config::StoreConfig;
use crate::dataset::Dataset;
use crate::error::{DbError, Result};
use crate::schema::{SchemaRegistry, TableBuilder, TableSchema};
use crate::table::{RowHandle, Table};
use crate::transaction::Snapshot;
use crate::value::Row;

/// Mutable store contents guarded by the store lock.
#[derive(Debug)]
pub(crate) struct StoreState {
    /// Table definitions
    pub(crate) schemas: SchemaRegistry,
    /// Table rows, shared with snapshots until first write
    pub(crate) tables: IndexMap<String, Arc<Table>>,
    /// Snapshots of open transactions, innermost last
    pub(crate) snapshots: Vec<Snapshot>,
    /// Next row handle; never rewound by rollback
    next_handle: u64,
}

impl StoreState {
    fn new() -> Self {
        Self {
            schemas: SchemaRegistry::new(),
            tables: IndexMap::new(),
            snapshots: Vec::new(),
            next_handle: 1,
        }
    }

    pub(crate) fn schema(&self, name: &str) -> Result<&TableSchema> {
        self.schemas.schema_of(name)
    }

    pub(crate) fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| DbError::table_not_found(name))
    }

    /// Returns a writable table, copying it first if a snapshot shares it.
    pub(crate) fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .map(Arc::make_mut)
            .ok_or_else(|| DbError::table_not_found(name))
    }

    pub(crate) fn allocate_handle(&mut self) -> RowHandle {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

struct StoreInner {
    state: ReentrantMutex<RefCell<StoreState>>,
    config: StoreConfig,
}

/// Handle to an in-memory relational store.
///
/// Cloning the handle is cheap; all clones see the same tables. Every
/// operation runs to completion under a single store-wide reentrant lock, and
/// an open transaction holds that lock from begin to exit.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Store");
        match self.inner.state.lock().try_borrow() {
            Ok(state) => s
                .field("tables", &state.schemas.table_names())
                .field("transaction_depth", &state.snapshots.len()),
            Err(_) => s.field("state", &"<borrowed>"),
        };
        s.finish()
    }
}

impl Store {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: ReentrantMutex::new(RefCell::new(StoreState::new())),
                config,
            }),
        }
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Runs `f` with shared access to the store state.
    pub(crate) fn read<R>(&self, f: impl FnOnce(&StoreState) -> Result<R>) -> Result<R> {
        let guard = self.inner.state.lock();
        let state = guard
            .try_borrow()
            .map_err(|_| DbError::StoreBusy("store is being mutated"))?;
        f(&state)
    }

    /// Runs `f` with exclusive access to the store state.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut StoreState) -> Result<R>) -> Result<R> {
        let guard = self.inner.state.lock();
        let mut state = guard
            .try_borrow_mut()
            .map_err(|_| DbError::StoreBusy("store is being read"))?;
        f(&mut state)
    }

    /// Locks the store for the span of a transaction.
    pub(crate) fn lock(&self) -> parking_lot::ReentrantMutexGuard<'_, RefCell<StoreState>> {
        self.inner.state.lock()
    }

    /// Defines a table and allocates empty row storage if none exists.
    ///
    /// Redefining an existing table replaces its columns and keeps its rows.
    ///
    /// # Example
    /// ```
    /// let store = relstore_core::Store::new();
    /// store
    ///     .define_table("books", |t| {
    ///         t.primary_key("id");
    ///         t.string("title").not_null();
    ///     })
    ///     .unwrap();
    /// assert!(store.has_table("books").unwrap());
    /// ```
    pub fn define_table(&self, name: &str, define: impl FnOnce(&mut TableBuilder)) -> Result<()> {
        let mut builder = TableBuilder::new(name);
        define(&mut builder);
        let schema = builder.build()?;
        let capacity = self.inner.config.initial_table_capacity;

        self.write(|state| {
            let columns = schema.columns.len();
            let replaced = state.schemas.define(schema);
            state
                .tables
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Table::new(name, capacity)));
            debug!(table = name, columns, replaced, "defined table");
            Ok(())
        })
    }

    /// Removes a table's definition and rows.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.write(|state| {
            state.schemas.drop_table(name)?;
            state.tables.shift_remove(name);
            debug!(table = name, "dropped table");
            Ok(())
        })
    }

    /// Returns a copy of a table's schema.
    pub fn schema_of(&self, name: &str) -> Result<TableSchema> {
        self.read(|state| state.schema(name).cloned())
    }

    pub fn has_table(&self, name: &str) -> Result<bool> {
        self.read(|state| Ok(state.schemas.contains(name)))
    }

    /// Returns table names in definition order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.read(|state| Ok(state.schemas.table_names()))
    }

    /// Removes every row of a table, keeping its key high-water mark.
    pub fn clear_table(&self, name: &str) -> Result<usize> {
        self.write(|state| {
            state.schema(name)?;
            let table = state.table_mut(name)?;
            let removed = table.record_count();
            table.clear();
            debug!(table = name, removed, "cleared table");
            Ok(removed)
        })
    }

    /// Returns an unfiltered dataset over a table.
    ///
    /// The table is resolved when the dataset is used, so an unknown name
    /// surfaces as `TableNotFound` from the first operation.
    pub fn dataset(&self, table: &str) -> Dataset {
        Dataset::new(self.clone(), table)
    }

    /// Exports the whole store as comparable, serializable data.
    pub fn export(&self) -> Result<StoreImage> {
        self.read(|state| {
            let tables = state
                .schemas
                .iter()
                .map(|schema| {
                    let table = state.table(&schema.name)?;
                    Ok(TableImage {
                        schema: schema.clone(),
                        last_key: table.last_key(),
                        rows: table.rows().map(|r| r.values.clone()).collect(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(StoreImage { tables })
        })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time export of all schemas and rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreImage {
    /// Tables in definition order
    pub tables: Vec<TableImage>,
}

impl StoreImage {
    /// Looks up an exported table by name.
    pub fn table(&self, name: &str) -> Option<&TableImage> {
        self.tables.iter().find(|t| t.schema.name == name)
    }
}

/// Export of a single table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableImage {
    /// Column definitions
    pub schema: TableSchema,
    /// Key high-water mark
    pub last_key: i64,
    /// Rows in storage order
    pub rows: Vec<Row>,
}
