//! Backing row storage per table.

#[allow(clippy::module_inception)]
mod table;

pub use table::{RowHandle, StoredRow, Table};
