//! All-or-nothing execution of multi-statement writes.
//!
//! Each `run` call begins its own transaction on the shared pool. Work that
//! fails is rolled back before its error is returned; a failed commit is an
//! error even though every statement succeeded. A `DatabaseTransaction` that is
//! dropped while open (the caller's future was cancelled) rolls back on drop.

use std::future::Future;
use std::pin::Pin;

use configs::DeleteStrategy;
use models::{profile, user};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, error, warn};

use super::errors::UserError;

/// Future produced by transactional work borrowing the open transaction.
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, UserError>> + Send + 'c>>;

#[derive(Clone, Debug)]
pub struct TransactionCoordinator {
    db: DatabaseConnection,
    strategy: DeleteStrategy,
}

impl TransactionCoordinator {
    pub fn new(db: DatabaseConnection, strategy: DeleteStrategy) -> Self { Self { db, strategy } }

    pub fn strategy(&self) -> DeleteStrategy { self.strategy }

    /// Begin, run `work`, then commit; roll back if `work` fails.
    pub async fn run<T, F>(&self, op: &'static str, work: F) -> Result<T, UserError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T> + Send,
    {
        let txn = self.db.begin().await.map_err(|e| UserError::store("begin transaction", e))?;
        let outcome = work(&txn).await;
        match outcome {
            Ok(value) => {
                txn.commit().await.map_err(|e| {
                    error!(op, error = %e, "commit failed");
                    UserError::store("commit transaction", e)
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rb) = txn.rollback().await {
                    warn!(op, error = %rb, "rollback failed");
                }
                debug!(op, code = err.code(), error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }
}

/// Remove (or tombstone) the active user row. Returns rows affected.
pub async fn remove_user<C: ConnectionTrait>(conn: &C, strategy: DeleteStrategy, id: i32) -> Result<u64, UserError> {
    let affected = match strategy {
        DeleteStrategy::Soft => user::soft_delete(conn, id).await?,
        DeleteStrategy::Hard => user::hard_delete(conn, id).await?,
    };
    Ok(affected)
}

/// Remove (or tombstone) the profile owned by `user_id`. Zero rows is a valid outcome.
pub async fn remove_profile<C: ConnectionTrait>(conn: &C, strategy: DeleteStrategy, user_id: i32) -> Result<u64, UserError> {
    let affected = match strategy {
        DeleteStrategy::Soft => profile::soft_delete_by_user(conn, user_id).await?,
        DeleteStrategy::Hard => profile::hard_delete_by_user(conn, user_id).await?,
    };
    Ok(affected)
}
