use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit payload serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Audit storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
