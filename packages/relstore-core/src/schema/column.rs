//! Column and table definitions.

use std::fmt;

use serde::Serialize;

use crate::error::{DbError, Result};
use crate::value::Value;

/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Decimal,
    Float,
    Date,
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Decimal => "decimal",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Column definition within a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Declared type
    pub column_type: ColumnType,
    /// Whether this column is the table's primary key
    pub primary_key: bool,
    /// Whether the store assigns values for this column on insert
    pub auto_increment: bool,
    /// Whether the column was declared not-null
    pub not_null: bool,
    /// Default value metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ColumnDef {
    /// Creates a nullable column with no constraints.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            primary_key: false,
            auto_increment: false,
            not_null: false,
            default: None,
        }
    }

    /// Marks the column not-null.
    pub fn not_null(&mut self) -> &mut Self {
        self.not_null = true;
        self
    }

    /// Records a default value.
    pub fn default(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(value.into());
        self
    }
}

/// Ordered column definitions for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Column definitions in declaration order
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks up a column by name, failing with `FieldNotFound`.
    pub fn require_column(&self, name: &str) -> Result<&ColumnDef> {
        self.column(name)
            .ok_or_else(|| DbError::field_not_found(&self.name, name))
    }

    /// Returns the primary key column, if the table declares one.
    pub fn primary_key(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.primary_key)
    }

    /// Returns the column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Collects column definitions for `Store::define_table`.
#[derive(Debug)]
pub struct TableBuilder {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Declares an auto-incrementing integer primary key.
    pub fn primary_key(&mut self, name: &str) -> &mut ColumnDef {
        let column = self.column(name, ColumnType::Integer);
        column.primary_key = true;
        column.auto_increment = true;
        column
    }

    /// Declares a column of the given type.
    ///
    /// Declaring the same name twice replaces nothing; the duplicate is
    /// reported when the table is built.
    pub fn column(&mut self, name: &str, column_type: ColumnType) -> &mut ColumnDef {
        self.columns.push(ColumnDef::new(name, column_type));
        let last = self.columns.len() - 1;
        &mut self.columns[last]
    }

    pub fn string(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::String)
    }

    pub fn integer(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Integer)
    }

    pub fn decimal(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Decimal)
    }

    pub fn float(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Float)
    }

    pub fn date(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Date)
    }

    pub fn boolean(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Boolean)
    }

    /// Validates the collected columns and produces the table schema.
    pub(crate) fn build(self) -> Result<TableSchema> {
        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DbError::FieldAlreadyExists {
                    table: self.name.clone(),
                    field: column.name.clone(),
                });
            }
        }

        if self.columns.iter().filter(|c| c.primary_key).count() > 1 {
            return Err(DbError::InvalidSchema {
                table: self.name,
                message: "more than one primary key column".to_string(),
            });
        }

        Ok(TableSchema {
            name: self.name,
            columns: self.columns,
        })
    }
}
