//! Postgres persistence for the VidaPlus backend
//!
//! - [`DatabasePool`]: the shared pool, migrations and health checks
//! - [`UnitOfWork`]: one request's transaction, committed explicitly and
//!   rolled back on drop; [`UnitOfWork::commit_audited`] fires the audit hook
//!   after a successful commit
//! - [`repositories`]: typed queries over a borrowed connection
//! - [`PgAuditSink`]: the `audit_logs` writer behind the audit recorder
//! - [`seed_initial_data`]: administrator account and default facility
//!
//! Failures are [`DatabaseError`]s, which classify themselves into the shared
//! [`error_common::ErrorKind`] vocabulary (unique and foreign key violations
//! are conflicts, missing rows are not-found).
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use database_layer::{DatabasePool, PoolSettings, UnitOfWork};
//! use database_layer::repositories::PatientRepository;
//!
//! let pool = DatabasePool::new(&database_url, &PoolSettings::default()).await?;
//! pool.migrate().await?;
//!
//! let mut uow = UnitOfWork::begin(&pool).await?;
//! let updated = PatientRepository::new(uow.conn()).update(id, &changes).await?;
//! uow.commit_audited(&recorder, entry).await?;
//! ```

pub mod audit;
pub mod connection;
pub mod error;
pub mod models;
pub mod query;
pub mod repositories;
pub mod seed;
pub mod transaction;

pub use audit::PgAuditSink;
pub use connection::{DatabasePool, PoolSettings};
pub use error::{DatabaseError, DatabaseResult};
pub use query::{Page, PaginatedQuery};
pub use seed::{seed_initial_data, SeedAdmin};
pub use transaction::UnitOfWork;
