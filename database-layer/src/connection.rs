// Database connection management
use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{pool::PoolConnection, postgres::PgPoolOptions, PgPool, Postgres};
use std::time::Duration;
use tracing::{info, warn};

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Pool sizing and timeouts
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared Postgres pool handed to every request
#[derive(Clone, Debug)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Create a new database pool from connection string
    ///
    /// # Errors
    ///
    /// Fails when the first connection cannot be established.
    pub async fn new(connection_string: &str, settings: &PoolSettings) -> DatabaseResult<Self> {
        let pool = Self::options(settings)
            .connect(connection_string)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = settings.max_connections,
            "Database connection pool created successfully"
        );

        Ok(Self { pool })
    }

    /// Pool that connects on first use. Nothing touches the network here.
    ///
    /// # Errors
    ///
    /// Fails only when the connection string does not parse.
    pub fn connect_lazy(connection_string: &str, settings: &PoolSettings) -> DatabaseResult<Self> {
        let pool = Self::options(settings)
            .connect_lazy(connection_string)
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;
        Ok(Self { pool })
    }

    fn options(settings: &PoolSettings) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
    }

    /// Get the underlying PgPool
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check out a single connection for read-only work.
    ///
    /// # Errors
    ///
    /// Fails when the pool is exhausted or the database is unreachable.
    pub async fn acquire(&self) -> DatabaseResult<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }

    /// Apply pending migrations
    ///
    /// # Errors
    ///
    /// Fails when a migration does not apply cleanly.
    pub async fn migrate(&self) -> DatabaseResult<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Drops every table and reapplies the migrations. Development only.
    ///
    /// # Errors
    ///
    /// Fails when the schema cannot be dropped or rebuilt.
    pub async fn recreate_schema(&self) -> DatabaseResult<()> {
        warn!("Dropping and recreating the public schema");
        sqlx::query("DROP SCHEMA public CASCADE").execute(&self.pool).await?;
        sqlx::query("CREATE SCHEMA public").execute(&self.pool).await?;
        self.migrate().await
    }

    /// Check if the pool is healthy
    pub async fn is_healthy(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Database health check failed: {}", e);
                false
            }
        }
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}
