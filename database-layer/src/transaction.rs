// Per-request unit of work
use audit_engine::{AuditEntry, AuditRecorder};
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::debug;

use crate::connection::DatabasePool;
use crate::error::DatabaseResult;

/// One request's transaction.
///
/// Repositories borrow the connection through [`UnitOfWork::conn`]. Dropping
/// the unit without committing rolls everything back, so every early return
/// and `?` in a handler releases the transaction cleanly.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    /// Begin a new transaction
    ///
    /// # Errors
    ///
    /// Fails when no connection can be checked out of the pool.
    pub async fn begin(pool: &DatabasePool) -> DatabaseResult<Self> {
        debug!("Beginning transaction");
        let tx = pool.pool().begin().await?;
        Ok(Self { tx })
    }

    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    /// Commit without an audit entry. Reserved for bookkeeping writes such
    /// as last-access timestamps.
    ///
    /// # Errors
    ///
    /// Fails when Postgres rejects the commit.
    pub async fn commit(self) -> DatabaseResult<()> {
        self.tx.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Commit, then hand `entry` to the audit recorder.
    ///
    /// The entry is written in its own transaction after this one has
    /// committed. An audit failure is logged by the recorder and never
    /// turns a committed mutation into an error.
    ///
    /// # Errors
    ///
    /// Fails only when the business commit fails, in which case nothing is
    /// audited.
    pub async fn commit_audited(self, audit: &AuditRecorder, entry: AuditEntry) -> DatabaseResult<()> {
        audit.after_commit(self.commit(), entry).await
    }
}
