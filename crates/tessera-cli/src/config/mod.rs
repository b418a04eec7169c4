//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── format: OutputFormat        # text or json output
//! ├── telemetry: TelemetryConfig  # log filter and log format
//! └── command: Command            # catalog | check | ability | effective
//!     └── documents: DocumentConfig  # member and role documents
//! ```
//!
//! Options can be provided via CLI arguments or environment variables.

mod documents;
mod telemetry;

use std::process;

use anyhow::Context;
use clap::{Parser, ValueEnum};
pub use documents::DocumentConfig;
use serde::{Deserialize, Serialize};
pub use telemetry::TelemetryConfig;

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Output format for command results.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "tessera")]
#[command(about = "Inspect organisation permissions and evaluate member access")]
#[command(version)]
pub struct Cli {
    /// Output format for command results.
    #[arg(long, global = true, env = "TESSERA_FORMAT", value_enum, default_value_t = OutputFormat::Text)]
    #[serde(default)]
    pub format: OutputFormat,

    /// Logging configuration.
    #[clap(flatten)]
    pub telemetry: TelemetryConfig,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(documents) = self.command.documents() {
            documents
                .validate()
                .context("invalid document configuration")?;
        }
        Ok(())
    }

    /// Logs configuration at debug level.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            format = ?self.format,
            log_format = ?self.telemetry.log_format,
            command = self.command.name(),
            "cli configuration"
        );

        if let Some(documents) = self.command.documents() {
            documents.log();
        }
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::command::{Command, Mode};

    #[test]
    fn test_parse_check_command() {
        let cli = Cli::try_parse_from([
            "tessera",
            "check",
            "--member",
            "member.json",
            "--roles",
            "roles.json",
            "--any",
            "ticket:view",
            "ticket:edit",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Text);
        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.mode(), Mode::Any);
        assert!(!args.strict);
        assert_eq!(args.permissions, ["ticket:view", "ticket:edit"]);
        assert_eq!(args.documents.member.to_str(), Some("member.json"));
    }

    #[test]
    fn test_parse_check_strict_flag() {
        let cli = Cli::try_parse_from([
            "tessera", "check", "--member", "m.json", "--strict", "ticket:view",
        ])
        .unwrap();

        let Command::Check(args) = cli.command else {
            panic!("expected check command");
        };
        assert!(args.strict);
        assert_eq!(args.mode(), Mode::All);
    }

    #[test]
    fn test_parse_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["tessera", "catalog", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.command.documents().is_none());
    }

    #[test]
    fn test_parse_ability_command() {
        let cli = Cli::try_parse_from([
            "tessera", "ability", "--member", "m.json", "update", "ticket",
        ])
        .unwrap();

        let Command::Ability(args) = cli.command else {
            panic!("expected ability command");
        };
        assert_eq!(args.action, tessera_core::ability::Action::Update);
        assert_eq!(args.subject, tessera_core::ability::Subject::Ticket);
        assert!(args.documents.roles.is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_action() {
        let result = Cli::try_parse_from([
            "tessera", "ability", "--member", "m.json", "manage", "all",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_requires_a_permission() {
        let result = Cli::try_parse_from(["tessera", "check", "--member", "m.json"]);
        assert!(result.is_err());
    }
}
