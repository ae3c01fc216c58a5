//! Table name to schema mapping.

use indexmap::IndexMap;

use super::TableSchema;
use crate::error::{DbError, Result};

/// Registered table definitions in definition order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    tables: IndexMap<String, TableSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, replacing any previous definition of the same table.
    ///
    /// Returns whether a previous definition was replaced.
    pub fn define(&mut self, schema: TableSchema) -> bool {
        self.tables.insert(schema.name.clone(), schema).is_some()
    }

    /// Removes a table definition.
    pub fn drop_table(&mut self, name: &str) -> Result<TableSchema> {
        self.tables
            .shift_remove(name)
            .ok_or_else(|| DbError::table_not_found(name))
    }

    /// Returns the schema of a table, failing with `TableNotFound`.
    pub fn schema_of(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| DbError::table_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns table names in definition order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }
}
