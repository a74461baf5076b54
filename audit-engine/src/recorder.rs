use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error};

use crate::entry::AuditEntry;
use crate::sink::AuditSink;

/// Whether an entry reached the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    Dropped,
}

/// Best-effort front of an [`AuditSink`].
///
/// Never returns an error: a failing sink is logged and the entry dropped.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, entry: AuditEntry) -> RecordOutcome {
        match self.sink.write_entry(&entry).await {
            Ok(()) => {
                debug!(
                    actor_id = entry.actor_id,
                    action = %entry.action,
                    table = %entry.table,
                    record_id = ?entry.record_id,
                    "Audit entry recorded"
                );
                RecordOutcome::Recorded
            }
            Err(e) => {
                error!(
                    actor_id = entry.actor_id,
                    action = %entry.action,
                    table = %entry.table,
                    record_id = ?entry.record_id,
                    error = %e,
                    "Failed to record audit entry"
                );
                RecordOutcome::Dropped
            }
        }
    }

    /// Post-commit hook: awaits `commit` and records `entry` only if the
    /// commit succeeded. The commit's own result is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns the commit's error. Audit failures never surface here.
    pub async fn after_commit<T, E, F>(&self, commit: F, entry: AuditEntry) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let committed = commit.await?;
        self.record(entry).await;
        Ok(committed)
    }
}

impl std::fmt::Debug for AuditRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditRecorder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditAction;
    use crate::error::{AuditError, Result as AuditResult};
    use crate::sink::MemoryAuditSink;
    use async_trait::async_trait;
    use serde_json::json;

    struct UnavailableSink;

    #[async_trait]
    impl AuditSink for UnavailableSink {
        async fn write_entry(&self, _entry: &AuditEntry) -> AuditResult<()> {
            Err(AuditError::StorageError("connection refused".to_string()))
        }
    }

    fn entry() -> AuditEntry {
        AuditEntry::new(1, AuditAction::Create, "patients")
            .record_id(10)
            .after(json!({ "name": "Maria" }))
    }

    #[tokio::test]
    async fn records_into_sink() {
        let sink = Arc::new(MemoryAuditSink::default());
        let recorder = AuditRecorder::new(sink.clone());

        assert_eq!(recorder.record(entry()).await, RecordOutcome::Recorded);

        let stored = sink.entries().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].action, AuditAction::Create);
        assert_eq!(stored[0].record_id, Some(10));
    }

    #[tokio::test]
    async fn failing_sink_is_swallowed() {
        let recorder = AuditRecorder::new(Arc::new(UnavailableSink));
        assert_eq!(recorder.record(entry()).await, RecordOutcome::Dropped);
    }

    #[tokio::test]
    async fn mutation_succeeds_when_audit_storage_is_down() {
        let recorder = AuditRecorder::new(Arc::new(UnavailableSink));
        let mutation = async { Ok::<_, String>("patient 10 created") };

        let outcome = recorder.after_commit(mutation, entry()).await;
        assert_eq!(outcome, Ok("patient 10 created"));
    }

    #[tokio::test]
    async fn failed_commit_is_not_audited() {
        let sink = Arc::new(MemoryAuditSink::default());
        let recorder = AuditRecorder::new(sink.clone());
        let mutation = async { Err::<(), _>("serialization failure") };

        let outcome = recorder.after_commit(mutation, entry()).await;
        assert_eq!(outcome, Err("serialization failure"));
        assert!(sink.entries().await.is_empty());
    }
}
