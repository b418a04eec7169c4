//! Member and role document locations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyhowResult, anyhow};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tessera_core::model::{Member, Role};

use crate::TRACING_TARGET_CONFIG;

/// Where to read the member and role documents from.
///
/// # Environment Variables
///
/// - `TESSERA_MEMBER` - Path to the member document (JSON object)
/// - `TESSERA_ROLES` - Path to the role documents (JSON array)
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct DocumentConfig {
    /// Path to the member document.
    #[arg(long, env = "TESSERA_MEMBER")]
    pub member: PathBuf,

    /// Path to the organisation's role documents.
    ///
    /// Only needed when the member references its role by id.
    #[arg(long, env = "TESSERA_ROLES")]
    pub roles: Option<PathBuf>,
}

impl DocumentConfig {
    /// Checks that the configured paths point to files.
    pub fn validate(&self) -> AnyhowResult<()> {
        ensure_file(&self.member)?;
        if let Some(roles) = &self.roles {
            ensure_file(roles)?;
        }
        Ok(())
    }

    /// Logs the configured paths.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            member = %self.member.display(),
            roles = ?self.roles.as_ref().map(|path| path.display().to_string()),
            "document configuration"
        );
    }

    /// Reads the member and its organisation's roles.
    pub fn load(&self) -> AnyhowResult<(Member, Vec<Role>)> {
        let member: Member = read_json(&self.member).context("failed to load member document")?;
        let roles: Vec<Role> = match &self.roles {
            Some(path) => read_json(path).context("failed to load role documents")?,
            None => Vec::new(),
        };

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            member_id = %member.id,
            roles = roles.len(),
            "documents loaded"
        );

        Ok((member, roles))
    }
}

fn ensure_file(path: &Path) -> AnyhowResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(anyhow!("{} is not a readable file", path.display()))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AnyhowResult<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
