// Postgres-backed audit sink
use async_trait::async_trait;
use audit_engine::{AuditEntry, AuditError, AuditSink};

use crate::connection::DatabasePool;

/// Writes audit entries into `audit_logs`, each in its own committed
/// transaction.
#[derive(Clone, Debug)]
pub struct PgAuditSink {
    pool: DatabasePool,
}

impl PgAuditSink {
    #[must_use]
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn write_entry(&self, entry: &AuditEntry) -> audit_engine::Result<()> {
        let storage = |e: sqlx::Error| AuditError::StorageError(e.to_string());

        let mut tx = self.pool.pool().begin().await.map_err(storage)?;

        sqlx::query(
            r"
            INSERT INTO audit_logs
                (user_id, action, table_name, record_id, previous_data, new_data, origin, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(entry.actor_id)
        .bind(entry.action.as_str())
        .bind(&entry.table)
        .bind(entry.record_id)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(&entry.origin)
        .bind(entry.recorded_at)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)
    }
}
