//! Guard and gate evaluation.
//!
//! Presentation and request layers describe what a protected surface needs
//! as a [`Requirement`], wrap it in a [`Guard`] (optionally with a redirect
//! target) and evaluate it against anything implementing [`Capability`]:
//! a [`PermissionChecker`] or an [`AppAbility`].

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_GUARD;
use crate::ability::{Action, AppAbility, Subject, permission_for};
use crate::checker::PermissionChecker;
use crate::error::{Error, Result};
use crate::model::PermissionSet;
use crate::permission::Permission;

/// Evaluator a guard can be checked against.
///
/// Both implementations share the owner bypass, so a guard gives the same
/// answer whichever evaluator the caller happens to hold.
pub trait Capability {
    /// Returns whether the evaluator represents an organisation owner.
    fn is_owner(&self) -> bool;

    /// Returns whether the permission is granted.
    fn permits(&self, permission: Permission) -> bool;

    /// Returns whether `action` on `subject` is granted.
    fn permits_action(&self, action: Action, subject: Subject) -> bool {
        self.is_owner() || permission_for(action, subject).is_some_and(|p| self.permits(p))
    }
}

impl Capability for PermissionChecker {
    fn is_owner(&self) -> bool {
        PermissionChecker::is_owner(self)
    }

    fn permits(&self, permission: Permission) -> bool {
        self.can(permission)
    }
}

impl Capability for AppAbility {
    fn is_owner(&self) -> bool {
        AppAbility::is_owner(self)
    }

    fn permits(&self, permission: Permission) -> bool {
        AppAbility::permits(self, permission)
    }

    fn permits_action(&self, action: Action, subject: Subject) -> bool {
        self.can(action, subject)
    }
}

/// What a protected surface requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Requirement {
    /// A single permission.
    Permission(Permission),
    /// At least one of the permissions; an empty list is owner-only.
    Any(Vec<Permission>),
    /// Every permission; an empty list is always satisfied.
    All(Vec<Permission>),
    /// An action/subject pair.
    Ability(Action, Subject),
    /// Every listed key, where at least one key is outside the catalog.
    /// Only an owner satisfies it.
    Unresolved(Vec<String>),
}

impl Requirement {
    /// Builds an [`Any`](Self::Any) requirement from raw keys, dropping the
    /// keys outside the catalog and returning them alongside.
    ///
    /// An unknown alternative can never be held, so dropping it does not
    /// change who passes; when every key is unknown only owners pass.
    pub fn any_lossy<I, S>(raw: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (permissions, unknown) = Self::split_lossy(raw);
        (Self::Any(permissions), unknown)
    }

    /// Builds an [`All`](Self::All) requirement from raw keys, returning the
    /// keys outside the catalog alongside.
    ///
    /// ```
    /// use tessera_core::checker::create_permission_checker;
    /// use tessera_core::guard::Requirement;
    ///
    /// let (requirement, unknown) = Requirement::all_lossy(["ticket:view", "ticket:fly"]);
    /// assert_eq!(unknown, ["ticket:fly"]);
    ///
    /// let owner = create_permission_checker(Vec::<&str>::new(), true);
    /// let agent = create_permission_checker(["ticket:view"], false);
    /// assert!(requirement.is_satisfied_by(&owner));
    /// assert!(!requirement.is_satisfied_by(&agent));
    /// ```
    pub fn all_lossy<I, S>(raw: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (permissions, unknown) = Self::split_lossy(raw);
        if unknown.is_empty() {
            return (Self::All(permissions), unknown);
        }

        let keys = permissions
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .chain(unknown.iter().cloned())
            .collect();

        (Self::Unresolved(keys), unknown)
    }

    fn split_lossy<I, S>(raw: I) -> (Vec<Permission>, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut permissions = Vec::new();
        let mut unknown = Vec::new();
        for key in raw {
            let key = key.as_ref();
            match Permission::parse(key) {
                Some(permission) if !permissions.contains(&permission) => permissions.push(permission),
                Some(_) => {}
                None if !unknown.iter().any(|seen| seen == key) => unknown.push(key.to_owned()),
                None => {}
            }
        }

        if !unknown.is_empty() {
            tracing::debug!(
                target: TRACING_TARGET_GUARD,
                unknown = ?unknown,
                "required permissions outside the catalog"
            );
        }

        (permissions, unknown)
    }

    /// Parses raw keys into an [`Any`](Self::Any) requirement, rejecting
    /// keys outside the catalog.
    pub fn parse_any<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::Any(Self::parse_list(raw)?))
    }

    /// Parses raw keys into an [`All`](Self::All) requirement, rejecting
    /// keys outside the catalog.
    pub fn parse_all<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::All(Self::parse_list(raw)?))
    }

    fn parse_list<I, S>(raw: I) -> Result<Vec<Permission>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut permissions = Vec::new();
        for key in raw {
            let key = key.as_ref();
            let permission = crate::permission::try_parse_permission(key)?;
            if !permissions.contains(&permission) {
                permissions.push(permission);
            }
        }

        Ok(permissions)
    }

    /// Returns true if `capability` satisfies this requirement.
    pub fn is_satisfied_by(&self, capability: &impl Capability) -> bool {
        if capability.is_owner() {
            return true;
        }

        match self {
            Self::Permission(permission) => capability.permits(*permission),
            Self::Any(permissions) => permissions.iter().any(|p| capability.permits(*p)),
            Self::All(permissions) => permissions.iter().all(|p| capability.permits(*p)),
            Self::Ability(action, subject) => capability.permits_action(*action, *subject),
            Self::Unresolved(_) => false,
        }
    }

    /// Returns the catalog permissions this requirement names, in order.
    pub fn permissions(&self) -> Vec<Permission> {
        match self {
            Self::Permission(permission) => vec![*permission],
            Self::Any(permissions) | Self::All(permissions) => permissions.clone(),
            Self::Ability(action, subject) => permission_for(*action, *subject).into_iter().collect(),
            Self::Unresolved(keys) => keys.iter().filter_map(|key| Permission::parse(key)).collect(),
        }
    }

    fn missing(&self, capability: &impl Capability) -> Vec<Permission> {
        match self {
            Self::Any(_) => self.permissions(),
            _ => self
                .permissions()
                .into_iter()
                .filter(|p| !capability.permits(*p))
                .collect(),
        }
    }
}

impl From<Permission> for Requirement {
    fn from(permission: Permission) -> Self {
        Self::Permission(permission)
    }
}

impl From<PermissionSet> for Requirement {
    fn from(permissions: PermissionSet) -> Self {
        Self::All(permissions.into_iter().collect())
    }
}

/// Outcome of a guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum GuardDecision {
    /// The protected surface may be shown or the action performed.
    Allow,
    /// Access denied.
    Deny {
        /// Permissions whose absence caused the denial. For
        /// [`Requirement::Any`] these are all the alternatives. Keys outside
        /// the catalog are never listed.
        missing: Vec<Permission>,
        /// Where the presentation layer should navigate instead.
        redirect_to: Option<String>,
    },
}

impl GuardDecision {
    /// Returns true for [`GuardDecision::Allow`].
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns the redirect target of a denial.
    pub fn redirect_to(&self) -> Option<&str> {
        match self {
            Self::Allow => None,
            Self::Deny { redirect_to, .. } => redirect_to.as_deref(),
        }
    }

    /// Converts the decision to a `Result`, returning a forbidden error if
    /// access is denied.
    ///
    /// ```
    /// use tessera_core::ErrorKind;
    /// use tessera_core::guard::GuardDecision;
    ///
    /// assert!(GuardDecision::Allow.into_result().is_ok());
    ///
    /// let denied = GuardDecision::Deny { missing: vec![], redirect_to: None };
    /// assert_eq!(denied.into_result().unwrap_err().kind(), ErrorKind::Forbidden);
    /// ```
    pub fn into_result(self) -> Result<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny { missing, .. } if missing.is_empty() => Err(Error::forbidden()),
            Self::Deny { missing, .. } => {
                let keys: Vec<_> = missing.iter().map(|p| p.as_str()).collect();
                Err(Error::forbidden().with_message(format!("missing {}", keys.join(", "))))
            }
        }
    }
}

/// A requirement plus the redirect to follow when it is not met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guard {
    pub requirement: Requirement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
}

impl Guard {
    /// Creates a guard without a redirect.
    pub fn new(requirement: impl Into<Requirement>) -> Self {
        Self {
            requirement: requirement.into(),
            redirect_to: None,
        }
    }

    /// Sets the redirect target used on denial.
    pub fn redirect_to(mut self, target: impl Into<Cow<'static, str>>) -> Self {
        self.redirect_to = Some(target.into().into_owned());
        self
    }

    /// Evaluates the guard.
    pub fn evaluate(&self, capability: &impl Capability) -> GuardDecision {
        if self.requirement.is_satisfied_by(capability) {
            tracing::trace!(
                target: TRACING_TARGET_GUARD,
                requirement = ?self.requirement,
                "guard allowed"
            );

            return GuardDecision::Allow;
        }

        let missing = self.requirement.missing(capability);
        tracing::debug!(
            target: TRACING_TARGET_GUARD,
            requirement = ?self.requirement,
            missing = ?missing,
            redirect_to = ?self.redirect_to,
            "guard denied"
        );

        GuardDecision::Deny {
            missing,
            redirect_to: self.redirect_to.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::ability::define_ability_for;
    use crate::checker::create_permission_checker;

    #[test]
    fn test_single_permission_guard() {
        let checker = create_permission_checker(["ticket:view"], false);

        assert!(Guard::new(Permission::ViewTickets).evaluate(&checker).is_allowed());

        let decision = Guard::new(Permission::DeleteTickets)
            .redirect_to("/tickets")
            .evaluate(&checker);
        assert_eq!(
            decision,
            GuardDecision::Deny {
                missing: vec![Permission::DeleteTickets],
                redirect_to: Some("/tickets".to_owned()),
            }
        );
        assert_eq!(decision.redirect_to(), Some("/tickets"));
    }

    #[test]
    fn test_any_and_all_guards() {
        let checker = create_permission_checker(["ticket:view", "ticket:edit"], false);

        let any = Requirement::parse_any(["ticket:delete", "ticket:edit"]).unwrap();
        assert!(any.is_satisfied_by(&checker));

        let all = Requirement::parse_all(["ticket:view", "ticket:delete"]).unwrap();
        let decision = Guard::new(all).evaluate(&checker);
        assert_eq!(
            decision,
            GuardDecision::Deny {
                missing: vec![Permission::DeleteTickets],
                redirect_to: None,
            }
        );

        let none = Guard::new(Requirement::Any(vec![
            Permission::DeleteTickets,
            Permission::AssignTickets,
        ]));
        let GuardDecision::Deny { missing, .. } = none.evaluate(&checker) else {
            panic!("expected denial");
        };
        assert_eq!(missing, [Permission::DeleteTickets, Permission::AssignTickets]);
    }

    #[test]
    fn test_vacuous_requirements() {
        let member = create_permission_checker(["ticket:view"], false);
        let owner = create_permission_checker(Vec::<&str>::new(), true);

        assert!(!Requirement::Any(vec![]).is_satisfied_by(&member));
        assert!(Requirement::Any(vec![]).is_satisfied_by(&owner));
        assert!(Requirement::All(vec![]).is_satisfied_by(&member));
        assert!(Requirement::All(vec![]).is_satisfied_by(&owner));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let error = Requirement::parse_all(["ticket:view", "ticket:fly"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidPermission);

        let deduplicated = Requirement::parse_any(["post:view", "post:view"]).unwrap();
        assert_eq!(deduplicated, Requirement::Any(vec![Permission::ViewPosts]));
    }

    #[test]
    fn test_lossy_any_drops_unknown_keys() {
        let member = create_permission_checker(["ticket:edit"], false);
        let owner = create_permission_checker(Vec::<&str>::new(), true);

        let (requirement, unknown) =
            Requirement::any_lossy(["ticket:fly", "ticket:edit", "ticket:fly"]);
        assert_eq!(requirement, Requirement::Any(vec![Permission::EditTickets]));
        assert_eq!(unknown, ["ticket:fly"]);
        assert!(requirement.is_satisfied_by(&member));

        let (requirement, unknown) = Requirement::any_lossy(["ticket:fly"]);
        assert_eq!(requirement, Requirement::Any(vec![]));
        assert_eq!(unknown, ["ticket:fly"]);
        assert!(!requirement.is_satisfied_by(&member));
        assert!(requirement.is_satisfied_by(&owner));
    }

    #[test]
    fn test_lossy_all_with_unknown_key_is_owner_only() {
        let member = create_permission_checker(["ticket:view"], false);
        let owner = create_permission_checker(Vec::<&str>::new(), true);
        let ability = define_ability_for(["ticket:view"], false);

        let (requirement, unknown) = Requirement::all_lossy(["ticket:view", "ticket:fly"]);
        assert_eq!(
            requirement,
            Requirement::Unresolved(vec!["ticket:view".to_owned(), "ticket:fly".to_owned()])
        );
        assert_eq!(unknown, ["ticket:fly"]);
        assert_eq!(requirement.permissions(), [Permission::ViewTickets]);

        assert!(Guard::new(requirement.clone()).evaluate(&owner).is_allowed());
        let decision = Guard::new(requirement).redirect_to("/").evaluate(&member);
        assert_eq!(
            decision,
            GuardDecision::Deny {
                missing: vec![],
                redirect_to: Some("/".to_owned()),
            }
        );
        assert!(!Requirement::Unresolved(vec!["ticket:fly".to_owned()]).is_satisfied_by(&ability));

        let (known, unknown) = Requirement::all_lossy(["ticket:view"]);
        assert_eq!(known, Requirement::All(vec![Permission::ViewTickets]));
        assert!(unknown.is_empty());
        assert!(known.is_satisfied_by(&member));
    }

    #[test]
    fn test_ability_requirement_on_both_evaluators() {
        let raw = ["integration:connect"];
        let checker = create_permission_checker(raw, false);
        let ability = define_ability_for(raw, false);

        let connect = Requirement::Ability(Action::Connect, Subject::Integration);
        let disconnect = Requirement::Ability(Action::Disconnect, Subject::Integration);
        let unmapped = Requirement::Ability(Action::Schedule, Subject::Ticket);

        for capability in [&checker as &dyn SatisfiesRequirement, &ability] {
            assert!(capability.satisfies(&connect));
            assert!(!capability.satisfies(&disconnect));
            assert!(!capability.satisfies(&unmapped));
        }

        let owner = define_ability_for(Vec::<&str>::new(), true);
        assert!(unmapped.is_satisfied_by(&owner));
    }

    #[test]
    fn test_guard_agrees_across_evaluators() {
        let raw = ["member:view", "member:add", "role:view"];
        let checker = create_permission_checker(raw, false);
        let ability = define_ability_for(raw, false);

        let guards = [
            Guard::new(Permission::ViewMembers),
            Guard::new(Permission::RemoveMembers),
            Guard::new(Requirement::All(vec![Permission::ViewMembers, Permission::AddMembers])),
            Guard::new(Requirement::Any(vec![Permission::EditRoles, Permission::DeleteRoles])),
        ];

        for guard in &guards {
            assert_eq!(guard.evaluate(&checker), guard.evaluate(&ability));
        }
    }

    #[test]
    fn test_into_result() {
        assert!(GuardDecision::Allow.into_result().is_ok());

        let denied = GuardDecision::Deny {
            missing: vec![Permission::ManageBilling],
            redirect_to: Some("/".to_owned()),
        };
        let error = denied.into_result().unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.to_string(), "Forbidden: missing organisation:billing");
    }

    #[test]
    fn test_guard_serde() {
        let json = r#"{"requirement":{"kind":"all","value":["ticket:view","ticket:edit"]},"redirect_to":"/"}"#;
        let guard: Guard = serde_json::from_str(json).unwrap();
        assert_eq!(
            guard.requirement,
            Requirement::All(vec![Permission::ViewTickets, Permission::EditTickets])
        );
        assert_eq!(guard.redirect_to.as_deref(), Some("/"));

        let decision = serde_json::to_value(GuardDecision::Allow).unwrap();
        assert_eq!(decision, serde_json::json!({ "decision": "allow" }));
    }

    /// Object-safe adapter so both evaluators can share one test loop.
    trait SatisfiesRequirement {
        fn satisfies(&self, requirement: &Requirement) -> bool;
    }

    impl<T: Capability> SatisfiesRequirement for T {
        fn satisfies(&self, requirement: &Requirement) -> bool {
            requirement.is_satisfied_by(self)
        }
    }
}
