//! Whole-store snapshots captured at transaction entry.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::schema::SchemaRegistry;
use crate::store::StoreState;
use crate::table::Table;

/// Structural copy of every schema and table at one point in time.
///
/// Tables are shared with the live store behind `Arc` and copied on the
/// first write after capture, so untouched tables cost nothing to keep.
/// A snapshot is only ever restored as a whole.
#[derive(Debug, Clone)]
pub struct Snapshot {
    schemas: SchemaRegistry,
    tables: IndexMap<String, Arc<Table>>,
}

impl Snapshot {
    pub(crate) fn capture(state: &StoreState) -> Self {
        Self {
            schemas: state.schemas.clone(),
            tables: state.tables.clone(),
        }
    }

    /// Replaces the store's schemas and rows with this snapshot.
    pub(crate) fn restore(self, state: &mut StoreState) {
        state.schemas = self.schemas;
        state.tables = self.tables;
    }
}
