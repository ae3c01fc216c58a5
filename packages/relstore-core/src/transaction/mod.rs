//! Snapshot-based transactions with nesting.
//!
//! `begin` captures a snapshot of every schema and row and pushes it on a
//! stack. Commit pops it; rollback, failure, or dropping an unfinished
//! handle pops it and restores the store from it wholesale. An inner
//! rollback therefore only undoes work since the inner begin, while an outer
//! rollback undoes everything since the outer begin, inner commits included.

mod snapshot;
mod transaction_handle;

pub(crate) use snapshot::Snapshot;
pub use transaction_handle::TransactionHandle;

use tracing::{info, warn};

use crate::error::{DbError, TransactionError};
use crate::store::Store;

/// Transaction manager state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    InTransaction {
        /// Number of open transactions, innermost included
        depth: usize,
    },
}

/// When a completed transaction body keeps its changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollbackMode {
    /// Commit on success, roll back on failure or explicit rollback
    #[default]
    OnError,
    /// Always roll back, even when the body succeeds
    Always,
}

/// Options for [`Store::transaction_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionOptions {
    pub rollback: RollbackMode,
}

impl TransactionOptions {
    /// Options that discard the body's changes unconditionally.
    pub fn always_rollback() -> Self {
        Self {
            rollback: RollbackMode::Always,
        }
    }
}

impl Store {
    /// Opens a transaction and returns its guard.
    pub fn begin(&self) -> Result<TransactionHandle<'_>, DbError> {
        TransactionHandle::begin(self)
    }

    /// Returns whether a transaction is open and how deeply nested it is.
    pub fn transaction_state(&self) -> Result<TransactionState, DbError> {
        self.read(|state| {
            Ok(match state.snapshots.len() {
                0 => TransactionState::Idle,
                depth => TransactionState::InTransaction { depth },
            })
        })
    }

    /// Runs `body` as one all-or-nothing unit of work.
    ///
    /// # Returns
    /// - `Ok(Some(value))` when the body succeeds; its changes stand.
    /// - `Ok(None)` when the body returns the rollback signal
    ///   (`DbError::Rollback`); the store is restored and nothing surfaces.
    /// - `Err(e)` with the body's own error, unchanged, after the store
    ///   has been restored.
    ///
    /// # Example
    /// ```
    /// use relstore_core::{row, DbError, Store};
    ///
    /// let store = Store::new();
    /// store.define_table("books", |t| { t.primary_key("id"); t.string("title"); }).unwrap();
    ///
    /// let outcome = store.transaction(|s| {
    ///     s.dataset("books").insert(row! { "title" => "Dune" })?;
    ///     Err::<(), _>(DbError::Rollback)
    /// });
    /// assert_eq!(outcome, Ok(None));
    /// assert_eq!(store.dataset("books").count().unwrap(), 0);
    /// ```
    pub fn transaction<T, E, F>(&self, body: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&Store) -> Result<T, E>,
        E: TransactionError,
    {
        self.transaction_with(TransactionOptions::default(), body)
    }

    /// Runs `body` as a transaction with explicit options.
    pub fn transaction_with<T, E, F>(&self, options: TransactionOptions, body: F) -> Result<Option<T>, E>
    where
        F: FnOnce(&Store) -> Result<T, E>,
        E: TransactionError,
    {
        let handle = self.begin()?;
        let depth = handle.depth();

        match body(self) {
            Ok(value) if options.rollback == RollbackMode::OnError => {
                handle.commit()?;
                info!(depth, "transaction committed");
                Ok(Some(value))
            }
            Ok(_) => {
                handle.rollback()?;
                info!(depth, "transaction rolled back (always)");
                Ok(None)
            }
            Err(err) if err.is_rollback() => {
                handle.rollback()?;
                info!(depth, "transaction rolled back on request");
                Ok(None)
            }
            Err(err) => {
                if let Err(restore_err) = handle.rollback() {
                    warn!(depth, error = %restore_err, "rollback after failure did not complete");
                }
                warn!(depth, "transaction failed; store restored");
                Err(err)
            }
        }
    }

    /// Runs `body` and then unconditionally restores the store.
    ///
    /// This is the per-test isolation contract: whatever the body does,
    /// including auto-increment progress, is undone before returning, and the
    /// body's own result is handed back. When both the body and the restore
    /// fail, the body's error is returned and the restore failure is logged.
    pub fn isolated<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&Store) -> Result<T, E>,
        E: From<DbError>,
    {
        let handle = self.begin()?;
        let depth = handle.depth();
        let result = body(self);
        let restored = handle.rollback();
        match (result, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(restore_err)) => Err(restore_err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                warn!(depth, error = %restore_err, "restore after failed isolated body did not complete");
                Err(err)
            }
        }
    }
}
