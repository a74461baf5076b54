use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::entry::AuditEntry;
use crate::error::Result;

/// Durable destination for audit entries.
///
/// Implementations persist one entry per call and commit it on their own,
/// independently of any transaction the caller may hold.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn write_entry(&self, entry: &AuditEntry) -> Result<()>;
}

/// Keeps entries in memory. Used by tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn write_entry(&self, entry: &AuditEntry) -> Result<()> {
        self.entries.lock().await.push(entry.clone());
        Ok(())
    }
}
