use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use audit_engine::{AuditRecorder, AuditSink};
use database_layer::{seed_initial_data, DatabasePool, PgAuditSink, PoolSettings, SeedAdmin};
use tracing::info;

use crate::auth::{PasswordService, TokenService};
use crate::config::ServerConfig;

/// Shared application state, cloned into every handler
#[derive(Clone, Debug)]
pub struct VidaPlusServer {
    pub config: Arc<ServerConfig>,
    pub database: DatabasePool,
    pub audit: AuditRecorder,
    pub tokens: TokenService,
    pub passwords: PasswordService,
    pub started_at: Instant,
}

impl VidaPlusServer {
    /// Connect, migrate and seed, then assemble the state.
    ///
    /// # Errors
    ///
    /// Fails when the database is unreachable, a migration fails, or the
    /// seed data cannot be written.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let database = DatabasePool::new(&config.database_url, &pool_settings(&config))
            .await
            .context("Failed to connect to the database")?;
        database.migrate().await.context("Failed to run migrations")?;

        let server = Self::with_pool(config, database);
        server.seed().await?;
        info!("Database ready");
        Ok(server)
    }

    /// Assemble the state around an existing pool. Nothing is migrated or
    /// seeded.
    #[must_use]
    pub fn with_pool(config: ServerConfig, database: DatabasePool) -> Self {
        let sink: Arc<dyn AuditSink> = Arc::new(PgAuditSink::new(database.clone()));
        Self {
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_hours),
            passwords: PasswordService::new(),
            audit: AuditRecorder::new(sink),
            database,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// State over a pool that connects on first use, for router tests
    ///
    /// # Errors
    ///
    /// Fails when the connection string does not parse.
    pub fn lazy(config: ServerConfig) -> Result<Self> {
        let database = DatabasePool::connect_lazy(&config.database_url, &pool_settings(&config))?;
        Ok(Self::with_pool(config, database))
    }

    /// Insert the configured administrator and the default facility.
    ///
    /// # Errors
    ///
    /// Fails when hashing or either insert fails.
    pub async fn seed(&self) -> Result<()> {
        let password_hash = self
            .passwords
            .hash(&self.config.admin_password)
            .await
            .context("Failed to hash the administrator password")?;
        let admin = SeedAdmin {
            email: self.config.admin_email.clone(),
            password_hash,
        };
        seed_initial_data(&self.database, &admin)
            .await
            .context("Failed to seed initial data")
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

fn pool_settings(config: &ServerConfig) -> PoolSettings {
    PoolSettings {
        max_connections: config.max_connections,
        ..PoolSettings::default()
    }
}
