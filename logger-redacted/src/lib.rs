//! Logging with automatic PII redaction
//!
//! Every line produced by the tracing subscriber installed through
//! [`init_tracing`] goes through a [`PiiRedactor`] before it reaches the
//! output stream, so handlers can log request paths and error messages
//! without leaking the personal data of patients and staff.
//!
//! # Detected Data Types
//!
//! - **CNPJ**: 12.345.678/0001-95 → CNPJ[hash]
//! - **CPF**: 123.456.789-09 → CPF[hash]
//! - **Email Addresses**: maria@example.com → EMAIL[hash]
//! - **Phone Numbers**: (11) 98765-4321 → PHONE[hash]
//! - **IP Addresses**: off by default, origins are useful when debugging
//!
//! Hashes are a short SHA-256 prefix, so the same value always redacts to
//! the same token and log lines can still be correlated.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{PiiRedactor, RedactionConfig};
//!
//! let redactor = PiiRedactor::new(RedactionConfig::default());
//! let line = redactor.redact("patient cpf=123.456.789-09 created");
//! assert!(!line.contains("123.456.789-09"));
//! ```

pub mod config;
pub mod redactor;
pub mod subscriber;
pub mod writer;

pub use config::*;
pub use redactor::*;
pub use subscriber::*;
pub use writer::*;
