//! String-level permission checker.
//!
//! [`PermissionChecker`] answers membership questions against an effective
//! permission set without deriving action/subject rules. Most guards only
//! need this.

use crate::TRACING_TARGET_CHECKER;
use crate::model::PermissionSet;
use crate::permission::Permission;

/// Immutable permission checker for one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionChecker {
    permissions: PermissionSet,
    is_owner: bool,
}

impl PermissionChecker {
    /// Creates a checker from a typed permission set.
    pub fn new(permissions: PermissionSet, is_owner: bool) -> Self {
        Self {
            permissions,
            is_owner,
        }
    }

    /// Returns true if the member owns the organisation or holds `permission`.
    #[inline]
    pub fn can(&self, permission: Permission) -> bool {
        self.is_owner || self.permissions.contains(&permission)
    }

    /// Negation of [`can`](Self::can).
    #[inline]
    pub fn cannot(&self, permission: Permission) -> bool {
        !self.can(permission)
    }

    /// Returns true if the member holds at least one of `permissions`.
    ///
    /// An empty list is only satisfied by owners.
    pub fn can_any(&self, permissions: &[Permission]) -> bool {
        self.is_owner || permissions.iter().any(|p| self.permissions.contains(p))
    }

    /// Returns true if the member holds every one of `permissions`.
    ///
    /// An empty list imposes no requirement and is always satisfied.
    pub fn can_all(&self, permissions: &[Permission]) -> bool {
        self.is_owner || permissions.iter().all(|p| self.permissions.contains(p))
    }

    /// Returns the required permissions the member does not hold.
    pub fn missing(&self, permissions: &[Permission]) -> Vec<Permission> {
        if self.is_owner {
            return Vec::new();
        }

        permissions
            .iter()
            .copied()
            .filter(|permission| !self.permissions.contains(permission))
            .collect()
    }

    /// Returns the owner flag.
    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// Returns the permission set the checker evaluates against.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }
}

/// Creates a checker from raw permission strings and an owner flag.
///
/// Strings outside the catalog are dropped; they can never match a
/// [`Permission`] anyway.
///
/// ```
/// use tessera_core::Permission;
/// use tessera_core::checker::create_permission_checker;
///
/// let checker = create_permission_checker(["ticket:view", "ticket:edit"], false);
/// assert!(checker.can(Permission::ViewTickets));
/// assert!(checker.cannot(Permission::DeleteTickets));
/// ```
pub fn create_permission_checker<I, S>(permissions: I, is_owner: bool) -> PermissionChecker
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (permissions, unknown) = PermissionSet::from_strs_lossy(permissions);
    tracing::trace!(
        target: TRACING_TARGET_CHECKER,
        permissions = permissions.len(),
        skipped = unknown.len(),
        is_owner,
        "permission checker created"
    );

    PermissionChecker::new(permissions, is_owner)
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_owner_bypass() {
        let empty = create_permission_checker(Vec::<&str>::new(), true);
        let partial = create_permission_checker(["ticket:view"], true);

        for permission in Permission::iter() {
            assert!(empty.can(permission));
            assert!(partial.can(permission));
            assert!(!empty.cannot(permission));
        }
        assert!(empty.can(Permission::DeleteOrganisation));
        assert!(empty.missing(&[Permission::ManageBilling]).is_empty());
    }

    #[test]
    fn test_exact_membership() {
        let raw = ["member:view", "role:delete", "post:schedule"];
        let checker = create_permission_checker(raw, false);

        for permission in Permission::iter() {
            let expected = raw.contains(&permission.as_str());
            assert_eq!(checker.can(permission), expected, "{permission}");
            assert_eq!(checker.cannot(permission), !expected, "{permission}");
        }
    }

    #[test]
    fn test_ticket_scenario() {
        let checker = create_permission_checker(["ticket:view", "ticket:edit"], false);

        assert!(checker.can(Permission::ViewTickets));
        assert!(!checker.can(Permission::DeleteTickets));
        assert!(checker.can_all(&[Permission::ViewTickets, Permission::EditTickets]));
        assert!(!checker.can_all(&[Permission::ViewTickets, Permission::DeleteTickets]));
        assert!(checker.can_any(&[Permission::DeleteTickets, Permission::EditTickets]));
        assert!(!checker.can_any(&[Permission::DeleteTickets, Permission::AssignTickets]));
        assert_eq!(
            checker.missing(&[Permission::ViewTickets, Permission::DeleteTickets]),
            [Permission::DeleteTickets]
        );
    }

    #[test]
    fn test_vacuous_combinators() {
        let member = create_permission_checker(["ticket:view"], false);
        let owner = create_permission_checker(Vec::<&str>::new(), true);
        let nobody = PermissionChecker::default();

        assert!(!member.can_any(&[]));
        assert!(owner.can_any(&[]));
        assert!(!nobody.can_any(&[]));

        assert!(member.can_all(&[]));
        assert!(owner.can_all(&[]));
        assert!(nobody.can_all(&[]));
    }

    #[test]
    fn test_unknown_strings_are_ignored() {
        let checker = create_permission_checker(["not:a:real:permission", "ticket:view"], false);
        assert_eq!(checker.permissions().keys(), ["ticket:view"]);
        assert!(!checker.is_owner());
    }

    #[test]
    fn test_evaluators_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<PermissionChecker>();
        assert_send_sync::<crate::ability::AppAbility>();
        assert_send_sync::<crate::model::EffectivePermissions>();
    }
}
