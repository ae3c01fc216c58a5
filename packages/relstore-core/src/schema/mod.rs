//! Table definitions: column types, constraints, and the schema registry.
//!
//! The registry records constraints but does not enforce them. The only
//! constraint the store acts on is the primary key, which drives key
//! generation and uniqueness of keys within a table.

mod column;
mod registry;

pub use column::{ColumnDef, ColumnType, TableBuilder, TableSchema};
pub use registry::SchemaRegistry;
