//! `tessera check`, `tessera ability` and `tessera effective`.

use std::fmt;

use anyhow::Context;
use serde::Serialize;
use tessera_core::ability::{Action, Subject};
use tessera_core::guard::{Guard, GuardDecision, Requirement};
use tessera_core::model::{EffectivePermissions, Member, Role};

use super::Mode;
use crate::TRACING_TARGET_COMMAND;

/// Result of `tessera check`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub allowed: bool,
    pub is_owner: bool,
    pub requirement: Requirement,
    pub decision: GuardDecision,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<String>,
}

impl CheckReport {
    /// Resolves the member and evaluates the required permissions.
    ///
    /// Keys outside the catalog can only be satisfied by an owner and are
    /// reported back. With `strict` they are an error instead.
    pub fn build(
        member: &Member,
        roles: &[Role],
        permissions: &[String],
        mode: Mode,
        strict: bool,
    ) -> anyhow::Result<Self> {
        let (requirement, unknown) = match (mode, strict) {
            (Mode::Any, false) => Requirement::any_lossy(permissions),
            (Mode::All, false) => Requirement::all_lossy(permissions),
            (Mode::Any, true) => (
                Requirement::parse_any(permissions).context("invalid required permission")?,
                Vec::new(),
            ),
            (Mode::All, true) => (
                Requirement::parse_all(permissions).context("invalid required permission")?,
                Vec::new(),
            ),
        };

        let effective = member.effective_permissions(roles);
        let decision = Guard::new(requirement.clone()).evaluate(&effective.checker());

        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            member_id = %member.id,
            allowed = decision.is_allowed(),
            unknown = unknown.len(),
            "permission check evaluated"
        );

        Ok(Self {
            allowed: decision.is_allowed(),
            is_owner: effective.is_owner(),
            requirement,
            decision,
            unknown,
        })
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.decision {
            GuardDecision::Allow if self.is_owner => writeln!(f, "allowed (organisation owner)"),
            GuardDecision::Allow => writeln!(f, "allowed"),
            GuardDecision::Deny { missing, .. } => {
                let keys: Vec<_> = missing
                    .iter()
                    .map(|p| p.as_str().to_owned())
                    .chain(self.unknown.iter().map(|key| format!("{key} (unknown)")))
                    .collect();
                writeln!(f, "denied: missing {}", keys.join(", "))
            }
        }
    }
}

/// Result of `tessera ability`.
#[derive(Debug, Clone, Serialize)]
pub struct AbilityReport {
    pub allowed: bool,
    pub is_owner: bool,
    pub action: Action,
    pub subject: Subject,
}

impl AbilityReport {
    /// Resolves the member and evaluates the action/subject pair.
    pub fn build(member: &Member, roles: &[Role], action: Action, subject: Subject) -> Self {
        let ability = member.effective_permissions(roles).ability();
        let allowed = ability.can(action, subject);

        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            member_id = %member.id,
            %action,
            %subject,
            allowed,
            "ability evaluated"
        );

        Self {
            allowed,
            is_owner: ability.is_owner(),
            action,
            subject,
        }
    }
}

impl fmt::Display for AbilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.allowed { "can" } else { "cannot" };
        writeln!(f, "{verdict} {} {}", self.action, self.subject)
    }
}

/// Result of `tessera effective`.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct EffectiveReport {
    effective: EffectivePermissions,
}

impl EffectiveReport {
    pub fn build(member: &Member, roles: &[Role]) -> Self {
        Self {
            effective: member.effective_permissions(roles),
        }
    }
}

impl fmt::Display for EffectiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.effective.is_owner() {
            writeln!(f, "# organisation owner")?;
        }
        for permission in self.effective.permissions() {
            writeln!(f, "{permission}")?;
        }
        Ok(())
    }
}
