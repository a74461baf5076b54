use thiserror::Error;

use crate::codes::ErrorKind;

/// Domain error returned by repositories and services
#[derive(Error, Debug)]
pub enum VidaPlusError {
    /// The addressed record does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Input that breaks a validation or business rule
    #[error("{0}")]
    InvalidInput(String),

    /// Uniqueness or referential constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapped external errors, always internal
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VidaPlusError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Internal(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for VidaPlus operations
pub type Result<T> = std::result::Result<T, VidaPlusError>;

/// Logs an error together with its kind
pub fn log_error(context: &str, error: &VidaPlusError) {
    tracing::error!(
        context = context,
        kind = %error.kind(),
        error = %error,
        "VidaPlus error occurred"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_carry_their_kind() {
        assert_eq!(VidaPlusError::not_found("Patient").kind(), ErrorKind::NotFound);
        assert_eq!(VidaPlusError::invalid_input("bad").kind(), ErrorKind::InvalidInput);
        assert_eq!(VidaPlusError::conflict("dup").kind(), ErrorKind::Conflict);
        assert_eq!(VidaPlusError::internal("boom").kind(), ErrorKind::Internal);
    }

    #[test]
    fn anyhow_errors_are_internal() {
        let err: VidaPlusError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.to_string(), "socket closed");
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(VidaPlusError::not_found("Appointment").to_string(), "Appointment not found");
    }
}
