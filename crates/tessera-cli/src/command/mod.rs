//! Subcommands.

mod catalog;
mod evaluate;

use std::fmt;

use clap::{Args, Subcommand};
use serde::{Deserialize, Serialize};
use tessera_core::ability::{Action, Subject};

pub use self::catalog::CatalogReport;
pub use self::evaluate::{AbilityReport, CheckReport, EffectiveReport};
use crate::TRACING_TARGET_COMMAND;
use crate::config::{DocumentConfig, OutputFormat};

/// Whether a command allowed or denied access.
///
/// Informational commands always report [`Outcome::Allowed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Allowed,
    Denied,
}

impl Outcome {
    /// Process exit status for a command that failed before deciding.
    pub const ERROR_EXIT_CODE: i32 = 2;

    /// Returns the process exit status: 0 when allowed, 1 when denied.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Allowed => 0,
            Self::Denied => 1,
        }
    }
}

impl From<bool> for Outcome {
    fn from(allowed: bool) -> Self {
        if allowed { Self::Allowed } else { Self::Denied }
    }
}

/// How a list of required permissions is combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Any,
    All,
}

#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// List the permission catalog grouped by category.
    Catalog,
    /// Check a member against one or more permissions.
    Check(CheckArgs),
    /// Check a member against an action/subject pair.
    Ability(AbilityArgs),
    /// Print a member's effective permission set.
    Effective(EffectiveArgs),
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct CheckArgs {
    #[clap(flatten)]
    pub documents: DocumentConfig,

    /// Allow when any permission is held instead of all of them.
    #[arg(long)]
    #[serde(default)]
    pub any: bool,

    /// Fail on permission keys outside the catalog instead of denying.
    #[arg(long)]
    #[serde(default)]
    pub strict: bool,

    /// Required permissions, e.g. `ticket:view`.
    #[arg(required = true, num_args = 1..)]
    pub permissions: Vec<String>,
}

impl CheckArgs {
    /// Returns how the permissions are combined.
    pub fn mode(&self) -> Mode {
        if self.any { Mode::Any } else { Mode::All }
    }
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct AbilityArgs {
    #[clap(flatten)]
    pub documents: DocumentConfig,

    /// Action, e.g. `read` or `update`.
    pub action: Action,

    /// Subject, e.g. `ticket` or `member`.
    pub subject: Subject,
}

#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct EffectiveArgs {
    #[clap(flatten)]
    pub documents: DocumentConfig,
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Catalog => "catalog",
            Self::Check(_) => "check",
            Self::Ability(_) => "ability",
            Self::Effective(_) => "effective",
        }
    }

    /// Returns the document configuration of commands that read documents.
    pub fn documents(&self) -> Option<&DocumentConfig> {
        match self {
            Self::Catalog => None,
            Self::Check(args) => Some(&args.documents),
            Self::Ability(args) => Some(&args.documents),
            Self::Effective(args) => Some(&args.documents),
        }
    }

    /// Runs the command and prints its report.
    pub fn execute(&self, format: OutputFormat) -> anyhow::Result<Outcome> {
        tracing::debug!(target: TRACING_TARGET_COMMAND, command = self.name(), "running command");

        match self {
            Self::Catalog => {
                print_report(&CatalogReport::build(), format)?;
                Ok(Outcome::Allowed)
            }
            Self::Check(args) => {
                let (member, roles) = args.documents.load()?;
                let report = CheckReport::build(&member, &roles, &args.permissions, args.mode(), args.strict)?;
                print_report(&report, format)?;
                Ok(report.allowed.into())
            }
            Self::Ability(args) => {
                let (member, roles) = args.documents.load()?;
                let report = AbilityReport::build(&member, &roles, args.action, args.subject);
                print_report(&report, format)?;
                Ok(report.allowed.into())
            }
            Self::Effective(args) => {
                let (member, roles) = args.documents.load()?;
                print_report(&EffectiveReport::build(&member, &roles), format)?;
                Ok(Outcome::Allowed)
            }
        }
    }
}

fn print_report<T>(report: &T, format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + fmt::Display,
{
    match format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}
