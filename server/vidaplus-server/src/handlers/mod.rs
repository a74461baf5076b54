//! HTTP request handlers, one module per resource

pub mod appointments;
pub mod auth;
pub mod facilities;
pub mod health;
pub mod notifications;
pub mod patients;
pub mod prescriptions;
pub mod professionals;

use database_layer::DatabasePool;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

use crate::error::ApiResult;

/// Pooled connection for read-only handlers
pub(crate) async fn read_connection(pool: &DatabasePool) -> ApiResult<PoolConnection<Postgres>> {
    Ok(pool.acquire().await?)
}
