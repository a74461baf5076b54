// Logger configuration
use serde::{Deserialize, Serialize};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, ANSI colored
    Pretty,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    pub redaction_enabled: bool,
    pub format: LogFormat,
    /// Directive used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl LoggerConfig {
    /// Development defaults for the given crate target and verbosity.
    #[must_use]
    pub fn for_target(target: &str, verbose: bool) -> Self {
        let level = if verbose { "debug" } else { "info" };
        Self {
            default_filter: format!("{target}={level},tower_http=info,sqlx=warn,hyper=info"),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            redaction_enabled: true,
            format: LogFormat::Pretty,
            default_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_targets_get_debug_level() {
        let config = LoggerConfig::for_target("vidaplus_server", true);
        assert!(config.default_filter.starts_with("vidaplus_server=debug"));
        assert!(config.default_filter.contains("sqlx=warn"));

        let quiet = LoggerConfig::for_target("vidaplus_server", false);
        assert!(quiet.default_filter.starts_with("vidaplus_server=info"));
    }
}
