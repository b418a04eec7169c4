//! Ability builder.
//!
//! An [`AppAbility`] answers "can this member perform `action` on
//! `subject`?". It is derived once from an effective permission set and an
//! owner flag and is never mutated afterwards: refreshing a member means
//! building a new ability.
//!
//! Owner bypass is not encoded as a wildcard rule. It is a separate
//! [`EffectiveCapability::Owner`] variant that every query matches on first.

mod action;

use std::collections::BTreeSet;

pub use self::action::{Action, Subject, parse_permission, permission_for};
use crate::TRACING_TARGET_ABILITY;
use crate::model::PermissionSet;
use crate::permission::Permission;

/// What a member is capable of, after owner resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveCapability {
    /// Organisation owner: every action on every subject.
    Owner,
    /// Explicitly granted action/subject pairs.
    Granted(BTreeSet<(Action, Subject)>),
}

impl EffectiveCapability {
    /// Returns true if this capability allows `action` on `subject`.
    #[inline]
    pub fn allows(&self, action: Action, subject: Subject) -> bool {
        match self {
            Self::Owner => true,
            Self::Granted(rules) => rules.contains(&(action, subject)),
        }
    }
}

/// Immutable action/subject evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppAbility {
    capability: EffectiveCapability,
}

impl AppAbility {
    /// Builds an ability from an already-typed permission set.
    pub fn new(permissions: &PermissionSet, is_owner: bool) -> Self {
        if is_owner {
            return Self::owner();
        }

        let rules = permissions
            .iter()
            .map(|permission| permission.action_subject())
            .collect();

        Self {
            capability: EffectiveCapability::Granted(rules),
        }
    }

    /// Ability of an organisation owner.
    pub const fn owner() -> Self {
        Self {
            capability: EffectiveCapability::Owner,
        }
    }

    /// Ability that denies everything.
    pub fn empty() -> Self {
        Self {
            capability: EffectiveCapability::Granted(BTreeSet::new()),
        }
    }

    /// Returns true if `action` on `subject` is allowed.
    #[inline]
    pub fn can(&self, action: Action, subject: Subject) -> bool {
        self.capability.allows(action, subject)
    }

    /// Negation of [`can`](Self::can).
    #[inline]
    pub fn cannot(&self, action: Action, subject: Subject) -> bool {
        !self.can(action, subject)
    }

    /// Returns true if `action` is allowed on every subject at once.
    ///
    /// Only owners hold unrestricted rules, so granted rules never satisfy
    /// this even when they happen to cover every subject individually. The
    /// owner's rule covers every action as well, so `action` never changes
    /// the answer; it is taken so call sites read like [`can`](Self::can).
    pub fn can_on_every_subject(&self, _action: Action) -> bool {
        self.is_owner()
    }

    /// Returns true if the permission's mapped pair is allowed.
    pub fn permits(&self, permission: Permission) -> bool {
        let (action, subject) = permission.action_subject();
        self.can(action, subject)
    }

    /// Returns true for the owner variant.
    pub fn is_owner(&self) -> bool {
        matches!(self.capability, EffectiveCapability::Owner)
    }

    /// Returns the underlying capability.
    pub fn capability(&self) -> &EffectiveCapability {
        &self.capability
    }

    /// Iterates over the granted rules. Empty for owners.
    pub fn rules(&self) -> impl Iterator<Item = (Action, Subject)> + '_ {
        let rules = match &self.capability {
            EffectiveCapability::Owner => None,
            EffectiveCapability::Granted(rules) => Some(rules.iter().copied()),
        };

        rules.into_iter().flatten()
    }
}

impl Default for AppAbility {
    fn default() -> Self {
        Self::empty()
    }
}

/// Builds an ability from raw permission strings and an owner flag.
///
/// Owners receive an unrestricted ability and `permissions` is ignored.
/// Otherwise each string that resolves through [`parse_permission`] adds a
/// rule; the rest are skipped.
pub fn define_ability_for<I, S>(permissions: I, is_owner: bool) -> AppAbility
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if is_owner {
        tracing::trace!(target: TRACING_TARGET_ABILITY, "owner ability");
        return AppAbility::owner();
    }

    let mut rules = BTreeSet::new();
    let mut skipped = 0usize;
    for raw in permissions {
        match parse_permission(raw.as_ref()) {
            Some(rule) => {
                rules.insert(rule);
            }
            None => skipped += 1,
        }
    }

    tracing::trace!(
        target: TRACING_TARGET_ABILITY,
        rules = rules.len(),
        skipped,
        "ability defined"
    );

    AppAbility {
        capability: EffectiveCapability::Granted(rules),
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::checker::create_permission_checker;

    #[test]
    fn test_owner_can_everything() {
        let ability = define_ability_for(Vec::<&str>::new(), true);
        assert!(ability.is_owner());
        for action in Action::iter() {
            assert!(ability.can_on_every_subject(action));
            for subject in Subject::iter() {
                assert!(ability.can(action, subject));
            }
        }
        assert_eq!(ability.rules().count(), 0);
    }

    #[test]
    fn test_owner_ignores_permissions() {
        let ability = define_ability_for(["ticket:view"], true);
        assert!(ability.can(Action::Delete, Subject::Organisation));
        assert_eq!(ability.capability(), &EffectiveCapability::Owner);
    }

    #[test]
    fn test_granted_rules() {
        let ability = define_ability_for(["ticket:view", "ticket:edit"], false);
        assert!(ability.can(Action::Read, Subject::Ticket));
        assert!(ability.can(Action::Update, Subject::Ticket));
        assert!(ability.cannot(Action::Delete, Subject::Ticket));
        assert!(ability.cannot(Action::Read, Subject::Member));
        assert!(!ability.can_on_every_subject(Action::Read));
        assert_eq!(ability.rules().count(), 2);
    }

    #[test]
    fn test_every_subject_is_owner_only() {
        let readers: Vec<_> = Permission::iter().filter(|p| p.is_read_only()).collect();
        let ability = AppAbility::new(&readers.into_iter().collect(), false);

        for subject in Subject::iter() {
            assert!(ability.can(Action::Read, subject));
        }
        for action in Action::iter() {
            assert!(!ability.can_on_every_subject(action));
        }
    }

    #[test]
    fn test_empty_set_denies_everything() {
        let ability = define_ability_for(Vec::<String>::new(), false);
        for action in Action::iter() {
            for subject in Subject::iter() {
                assert!(ability.cannot(action, subject));
            }
        }
        assert_eq!(ability, AppAbility::default());
    }

    #[test]
    fn test_unknown_permissions_grant_nothing() {
        let ability = define_ability_for(["not:a:real:permission", "ticket:fly"], false);
        assert_eq!(ability.rules().count(), 0);
        assert!(ability.cannot(Action::Read, Subject::Ticket));

        let mixed = define_ability_for(["not:a:real:permission", "post:schedule"], false);
        assert_eq!(mixed.rules().collect::<Vec<_>>(), [(Action::Schedule, Subject::Post)]);
    }

    #[test]
    fn test_typed_constructor_matches_raw_builder() {
        let set: PermissionSet = [Permission::ViewMembers, Permission::AddMembers]
            .into_iter()
            .collect();
        let typed = AppAbility::new(&set, false);
        let raw = define_ability_for(["member:view", "member:add"], false);
        assert_eq!(typed, raw);
        assert!(AppAbility::new(&set, true).is_owner());
    }

    #[test]
    fn test_ability_agrees_with_checker() {
        let raw = [
            "ticket:view",
            "ticket:edit",
            "role:delete",
            "organisation:billing",
            "post:schedule",
        ];
        let ability = define_ability_for(raw, false);
        let checker = create_permission_checker(raw, false);

        for permission in Permission::iter() {
            let (action, subject) = permission.action_subject();
            assert_eq!(
                ability.can(action, subject),
                checker.can(permission),
                "disagreement on {permission}"
            );
            assert_eq!(ability.permits(permission), checker.can(permission));
        }
    }
}
