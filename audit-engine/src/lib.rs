//! Audit trail recording for the VidaPlus backend
//!
//! Every mutating request leaves exactly one [`AuditEntry`] behind: who
//! acted, what they did, on which table and record, the state before and
//! after, and where the request came from.
//!
//! Recording is best-effort. The entry is written after the business
//! mutation has committed, through an [`AuditSink`], and a sink failure is
//! logged and swallowed by [`AuditRecorder`] instead of failing the request.
//! A crash between the two commits loses that one entry.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use audit_engine::{AuditAction, AuditEntry, AuditRecorder, MemoryAuditSink};
//! use serde_json::json;
//!
//! # tokio_test_block_on(async {
//! let sink = Arc::new(MemoryAuditSink::default());
//! let recorder = AuditRecorder::new(sink.clone());
//!
//! let commit = async { Ok::<_, std::io::Error>(42_i64) };
//! let entry = AuditEntry::new(1, AuditAction::Create, "patients")
//!     .record_id(42)
//!     .after(json!({ "name": "Maria" }));
//!
//! let id = recorder.after_commit(commit, entry).await.unwrap();
//! assert_eq!(id, 42);
//! assert_eq!(sink.entries().await.len(), 1);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod entry;
pub mod error;
pub mod recorder;
pub mod sink;

pub use entry::*;
pub use error::*;
pub use recorder::*;
pub use sink::*;
