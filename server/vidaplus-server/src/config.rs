//! Server configuration
//!
//! Every flag falls back to an environment variable, and `main` loads a
//! `.env` file before parsing, so deployments can configure the server
//! entirely through the environment.

use std::fmt;
use std::net::SocketAddr;

use clap::{Parser, ValueEnum};
use logger_redacted::LogFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    /// Production logs are JSON lines; development logs are for humans.
    #[must_use]
    pub fn log_format(self) -> LogFormat {
        match self {
            Self::Development => LogFormat::Pretty,
            Self::Production => LogFormat::Json,
        }
    }
}

/// VidaPlus health services HTTP API server
#[derive(Parser, Clone)]
#[command(name = "vidaplus-server", version)]
#[command(about = "Hospital management HTTP API server")]
pub struct ServerConfig {
    /// Server bind address
    #[arg(long, env = "VIDAPLUS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(short, long, env = "VIDAPLUS_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Secret used to sign access tokens
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret: String,

    /// Access token lifetime
    #[arg(long, env = "JWT_TTL_HOURS", default_value_t = 24)]
    pub token_ttl_hours: i64,

    #[arg(long, env = "VIDAPLUS_ENV", value_enum, default_value = "development")]
    pub environment: Environment,

    /// Mount the schema recreation endpoint
    #[arg(long, env = "VIDAPLUS_DEV_ENDPOINTS", default_value_t = false)]
    pub enable_dev_endpoints: bool,

    /// Administrator account seeded on startup
    #[arg(long, env = "VIDAPLUS_ADMIN_EMAIL", default_value = "admin@vidaplus.com")]
    pub admin_email: String,

    #[arg(
        long,
        env = "VIDAPLUS_ADMIN_PASSWORD",
        default_value = "Admin@123",
        hide_env_values = true
    )]
    pub admin_password: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Fails when `host` is not an IP address.
    pub fn bind_address(&self) -> anyhow::Result<SocketAddr> {
        let ip = self
            .host
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid host '{}': {e}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Configuration for tests and tools that never bind a socket
    #[must_use]
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: database_url.into(),
            max_connections: 2,
            jwt_secret: "test-secret-key".to_string(),
            token_ttl_hours: 1,
            environment: Environment::Development,
            enable_dev_endpoints: false,
            admin_email: "admin@vidaplus.com".to_string(),
            admin_password: "Admin@123".to_string(),
            verbose: false,
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("environment", &self.environment)
            .field("enable_dev_endpoints", &self.enable_dev_endpoints)
            .field("admin_email", &self.admin_email)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec![
            "vidaplus-server",
            "--database-url",
            "postgres://localhost/vidaplus",
            "--jwt-secret",
            "s3cret",
        ];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);
        assert_eq!(config.port, 5000);
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.environment, Environment::Development);
        assert!(!config.enable_dev_endpoints);
        assert_eq!(config.admin_email, "admin@vidaplus.com");
    }

    #[test]
    fn production_switches_to_json_logs() {
        let config = parse(&["--environment", "production"]);
        assert_eq!(config.environment.log_format(), LogFormat::Json);
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!("{:?}", parse(&[]));
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("postgres://"));
    }

    #[test]
    fn bind_address_requires_an_ip() {
        assert_eq!(parse(&["--port", "8080"]).bind_address().unwrap().port(), 8080);
        assert!(parse(&["--host", "not an ip"]).bind_address().is_err());
    }
}
