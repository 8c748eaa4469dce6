//! Transaction runner for multi-statement write workflows

use crate::{Error, Result};
use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

/// Runs a body inside one database transaction.
///
/// The body receives the transaction's connection. On `Ok` the transaction is committed; on
/// `Err` it is rolled back and the error returned unchanged. Callers only see a result once the
/// transaction has finished, so a response is never written before the commit or rollback.
#[derive(Clone)]
pub struct TransactionRunner {
    pool: PgPool,
}

impl TransactionRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn run<T, F>(&self, operation: &'static str, body: F) -> Result<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T>> + Send,
    {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!(operation, error = %e, "Failed to begin transaction");
            Error::Database(e)
        })?;
        tracing::debug!(operation, "Transaction started");

        let outcome = body(&mut *tx).await;
        match outcome {
            Ok(value) => match tx.commit().await {
                Ok(()) => {
                    tracing::debug!(operation, "Transaction committed");
                    Ok(value)
                }
                Err(e) => {
                    // A failed COMMIT leaves nothing applied; the connection discards the transaction.
                    tracing::error!(operation, error = %e, "Commit failed, transaction rolled back");
                    Err(Error::Database(e))
                }
            },
            Err(err) => {
                if let Err(e) = tx.rollback().await {
                    tracing::error!(operation, error = %e, "Rollback failed");
                } else {
                    tracing::debug!(operation, error = %err, "Transaction rolled back");
                }
                Err(err)
            }
        }
    }
}
