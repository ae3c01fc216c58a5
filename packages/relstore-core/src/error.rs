//! Store error types.

use thiserror::Error;

/// Store operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    /// Table not found
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    /// Field not found in table
    #[error("Field '{field}' not found in table '{table}'")]
    FieldNotFound { table: String, field: String },

    /// Field declared twice in one table definition
    #[error("Field '{field}' already exists in table '{table}'")]
    FieldAlreadyExists { table: String, field: String },

    /// Table definition is inconsistent
    #[error("Invalid schema for table '{table}': {message}")]
    InvalidSchema { table: String, message: String },

    /// Primary key already used by another row
    #[error("Duplicate primary key {key} in table '{table}'")]
    DuplicateKey { table: String, key: i64 },

    /// No primary key left above the table's high-water mark
    #[error("Primary key space exhausted in table '{table}'")]
    KeySpaceExhausted { table: String },

    /// Type mismatch error
    #[error("Type mismatch for '{field}': expected {expected}, got {got}")]
    TypeMismatch {
        field: String,
        expected: String,
        got: String,
    },

    /// Transaction finished out of order or otherwise misused
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// Store mutated from inside a predicate or other in-progress operation
    #[error("Store is busy: {0}")]
    StoreBusy(&'static str),

    /// Explicit rollback signal raised from a transaction body
    #[error("Transaction rolled back")]
    Rollback,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error while reading seed or config files
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DbError {
    /// Returns whether this error comes from a table definition or lookup.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            DbError::TableNotFound { .. }
                | DbError::FieldNotFound { .. }
                | DbError::FieldAlreadyExists { .. }
                | DbError::InvalidSchema { .. }
        )
    }

    pub(crate) fn table_not_found(table: &str) -> Self {
        DbError::TableNotFound {
            table: table.to_string(),
        }
    }

    pub(crate) fn field_not_found(table: &str, field: &str) -> Self {
        DbError::FieldNotFound {
            table: table.to_string(),
            field: field.to_string(),
        }
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::SerializationError(err.to_string())
    }
}

/// Errors that can escape a transaction body.
///
/// The transaction manager needs to tell an explicit rollback signal apart
/// from a real failure without changing the error that reaches the caller.
pub trait TransactionError: From<DbError> {
    /// Returns whether this error is the explicit rollback signal.
    fn is_rollback(&self) -> bool;
}

impl TransactionError for DbError {
    fn is_rollback(&self) -> bool {
        matches!(self, DbError::Rollback)
    }
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, DbError>;
