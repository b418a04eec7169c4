//! Logging configuration.

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Format of log lines written to stderr.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable, colored when stderr is a terminal.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging options.
///
/// The log level is taken from `RUST_LOG` and falls back to `--log-level`.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[arg(long, global = true, env = "TESSERA_LOG_LEVEL", default_value = "warn")]
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Format of log lines.
    #[arg(long, global = true, env = "TESSERA_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_owned()
}

impl TelemetryConfig {
    /// Creates the environment filter, preferring `RUST_LOG`.
    pub fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_level)
                .with_context(|| format!("invalid log level `{}`", self.log_level)),
        }
    }

    /// Initializes the tracing subscriber for structured logging.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is invalid or a subscriber is already
    /// installed.
    pub fn init_tracing(&self) -> anyhow::Result<()> {
        let env_filter = self.env_filter()?;
        let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match self.log_format {
            LogFormat::Pretty => fmt::layer().with_writer(std::io::stderr).boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed(),
        };

        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(env_filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let config = TelemetryConfig {
            log_level: "tessera=loud".to_owned(),
            log_format: LogFormat::Pretty,
        };

        if std::env::var_os("RUST_LOG").is_none() {
            assert!(config.env_filter().is_err());
        }
    }

    #[test]
    fn test_default_log_level_is_valid() {
        let config = TelemetryConfig {
            log_level: default_log_level(),
            log_format: LogFormat::Json,
        };
        assert!(EnvFilter::try_new(&config.log_level).is_ok());
    }
}
