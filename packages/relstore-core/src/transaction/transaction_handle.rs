use std::cell::RefCell;

use parking_lot::ReentrantMutexGuard;
use tracing::{debug, warn};

use crate::error::{DbError, Result};
use crate::store::{Store, StoreState};

use super::snapshot::Snapshot;

/// RAII guard for one transaction with auto-rollback on drop.
///
/// Holds the store lock from begin until the handle is finished, so no other
/// thread can observe or mutate the store in between. If the transaction is
/// neither committed nor rolled back explicitly, dropping the handle restores
/// the snapshot taken at begin. This also covers panics unwinding through a
/// transaction body.
pub struct TransactionHandle<'a> {
    lock: ReentrantMutexGuard<'a, RefCell<StoreState>>,
    /// Position of this transaction's snapshot on the stack (1-based)
    depth: usize,
    finished: bool,
}

impl<'a> TransactionHandle<'a> {
    /// Locks the store and pushes a snapshot of its current state.
    pub(crate) fn begin(store: &'a Store) -> Result<Self> {
        let lock = store.lock();
        let depth = {
            let mut state = lock
                .try_borrow_mut()
                .map_err(|_| DbError::StoreBusy("cannot begin a transaction inside a query"))?;
            let snapshot = Snapshot::capture(&state);
            state.snapshots.push(snapshot);
            state.snapshots.len()
        };
        debug!(depth, "transaction begin");
        Ok(Self {
            lock,
            depth,
            finished: false,
        })
    }

    /// Nesting depth of this transaction, starting at 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Keeps all changes made since begin and discards the snapshot.
    ///
    /// Fails with `TransactionConflict` if an inner transaction is still
    /// open; the handle then rolls back when dropped.
    pub fn commit(mut self) -> Result<()> {
        self.finish(false)?;
        debug!(depth = self.depth, "transaction committed");
        Ok(())
    }

    /// Restores the store to its state at begin.
    pub fn rollback(mut self) -> Result<()> {
        self.finish(true)?;
        debug!(depth = self.depth, "transaction rolled back");
        Ok(())
    }

    /// Returns whether the handle is still open.
    pub fn is_active(&self) -> bool {
        !self.finished
    }

    fn finish(&mut self, restore: bool) -> Result<()> {
        let mut state = self
            .lock
            .try_borrow_mut()
            .map_err(|_| DbError::StoreBusy("cannot finish a transaction inside a query"))?;

        let open = state.snapshots.len();
        if open < self.depth {
            self.finished = true;
            return Err(DbError::TransactionConflict(
                "snapshot already released by an enclosing transaction".to_string(),
            ));
        }
        if open > self.depth && !restore {
            return Err(DbError::TransactionConflict(format!(
                "cannot commit at depth {} while {} inner transaction(s) are open",
                self.depth,
                open - self.depth
            )));
        }

        // Release this snapshot and any inner ones left behind
        let snapshot = state.snapshots.drain(self.depth - 1..).next();
        if restore {
            if let Some(snapshot) = snapshot {
                snapshot.restore(&mut state);
            }
        }
        self.finished = true;
        Ok(())
    }
}

impl Drop for TransactionHandle<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match self.finish(true) {
            Ok(()) => debug!(depth = self.depth, "transaction rolled back on drop"),
            Err(e) => warn!(depth = self.depth, error = %e, "failed to roll back transaction on drop"),
        }
    }
}

impl std::fmt::Debug for TransactionHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionHandle")
            .field("depth", &self.depth)
            .field("finished", &self.finished)
            .finish()
    }
}
