//! Core storage engine for the in-memory relational store.
//!
//! Provides table schemas, row storage, chainable datasets, snapshot-based
//! nested transactions, and bulk loading of JSON seed data.

pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod schema;
mod store;
pub mod table;
pub mod transaction;
pub mod value;

pub use config::StoreConfig;
pub use dataset::{Criteria, Dataset};
pub use error::{DbError, Result, TransactionError};
pub use loader::{BulkLoader, JsonRecord, LoadReport};
pub use schema::{ColumnDef, ColumnType, TableBuilder, TableSchema};
pub use store::{Store, StoreImage, TableImage};
pub use transaction::{RollbackMode, TransactionHandle, TransactionOptions, TransactionState};
pub use value::{Row, Value};
