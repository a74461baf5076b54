use error_common::{ErrorKind, VidaPlusError};
use thiserror::Error;

// Postgres SQLSTATE codes we classify explicitly
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Classifies the failure for callers that branch on outcome.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::SqlxError(sqlx::Error::RowNotFound) => ErrorKind::NotFound,
            Self::SqlxError(sqlx::Error::Database(db)) => match db.code().as_deref() {
                Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION) => ErrorKind::Conflict,
                Some(CHECK_VIOLATION) => ErrorKind::InvalidInput,
                _ => ErrorKind::Internal,
            },
            _ => ErrorKind::Internal,
        }
    }

    /// Name of the violated constraint, when Postgres reported one.
    #[must_use]
    pub fn constraint(&self) -> Option<&str> {
        match self {
            Self::SqlxError(sqlx::Error::Database(db)) => db.constraint(),
            _ => None,
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::MigrationError(e.to_string())
    }
}

impl From<DatabaseError> for VidaPlusError {
    fn from(e: DatabaseError) -> Self {
        match e.kind() {
            ErrorKind::NotFound => match e {
                DatabaseError::NotFound(resource) => VidaPlusError::not_found(resource),
                _ => VidaPlusError::not_found("Record"),
            },
            ErrorKind::Conflict => VidaPlusError::conflict(conflict_message(e.constraint())),
            ErrorKind::InvalidInput => VidaPlusError::invalid_input("Value rejected by a database constraint"),
            ErrorKind::Internal => VidaPlusError::internal(e.to_string()),
        }
    }
}

fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("users_email_key") => "Email is already in use".to_string(),
        Some("patients_cpf_key") => "CPF is already registered".to_string(),
        Some("professionals_license_number_key") => "CRM/COREN is already registered".to_string(),
        Some("facilities_cnpj_key") => "CNPJ is already registered".to_string(),
        Some(name) if name.ends_with("_fkey") => "Record is still referenced by other records".to_string(),
        _ => "Record conflicts with existing data".to_string(),
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn explicit_not_found_keeps_resource_name() {
        let err: VidaPlusError = DatabaseError::NotFound("Patient".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Patient not found");
    }

    #[test]
    fn pool_errors_are_internal() {
        let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
        let converted: VidaPlusError = err.into();
        assert_eq!(converted.kind(), ErrorKind::Internal);
    }

    #[test]
    fn conflict_messages_name_the_duplicate() {
        assert_eq!(conflict_message(Some("patients_cpf_key")), "CPF is already registered");
        assert_eq!(
            conflict_message(Some("appointments_patient_id_fkey")),
            "Record is still referenced by other records"
        );
        assert_eq!(conflict_message(None), "Record conflicts with existing data");
    }
}
