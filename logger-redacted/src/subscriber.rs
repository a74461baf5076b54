// Global subscriber bootstrap
use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggerConfig};
use crate::redactor::{PiiRedactor, RedactionConfig};
use crate::writer::RedactingMakeWriter;

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to install global subscriber: {0}")]
    Install(String),
}

/// Installs the process-wide tracing subscriber.
///
/// `RUST_LOG` wins over `config.default_filter` when set.
///
/// # Errors
///
/// Fails when the default filter does not parse or a global subscriber is
/// already installed.
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.default_filter)
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let redactor = if config.redaction_enabled {
        PiiRedactor::default()
    } else {
        PiiRedactor::new(RedactionConfig {
            redact_documents: false,
            redact_emails: false,
            redact_phones: false,
            redact_ip_addresses: false,
            ..RedactionConfig::default()
        })
    };
    let writer = RedactingMakeWriter::new(std::io::stdout, redactor);

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(true)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json()
                    .with_writer(writer),
            )
            .try_init(),
    };

    installed.map_err(|e| LoggerError::Install(e.to_string()))
}
