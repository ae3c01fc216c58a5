//! Model layer error types.

use relstore_core::{DbError, TransactionError};
use thiserror::Error;

use crate::validation::FieldErrors;

/// Model operation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Error raised by the store
    #[error(transparent)]
    Db(#[from] DbError),

    /// Save attempted on an invalid model
    #[error("{kind} is invalid: {errors}")]
    Save { kind: String, errors: FieldErrors },

    /// Saved model's row no longer exists
    #[error("{kind} with id {id} not found")]
    NotFound { kind: String, id: i64 },

    /// Kind name not registered
    #[error("Unknown model kind '{0}'")]
    UnknownKind(String),

    /// Kind name registered twice
    #[error("Model kind '{0}' is already registered")]
    DuplicateKind(String),

    /// Association name not declared on a kind
    #[error("{kind} has no association '{name}'")]
    UnknownAssociation { kind: String, name: String },

    /// Association used with the wrong cardinality
    #[error("Association '{name}' on {kind} is {actual}, not {expected}")]
    AssociationMismatch {
        kind: String,
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl ModelError {
    /// Returns the field errors of a failed save.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ModelError::Save { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

impl TransactionError for ModelError {
    fn is_rollback(&self) -> bool {
        matches!(self, ModelError::Db(DbError::Rollback))
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
