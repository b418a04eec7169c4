//! Organisation members and effective permission resolution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{PermissionSet, Role};
use crate::TRACING_TARGET_MODEL;
use crate::ability::AppAbility;
use crate::checker::PermissionChecker;

/// Role attached to a membership record.
///
/// Persisted members either reference a role by id or carry a snapshot of
/// it. In JSON a reference is the bare id string and a snapshot is the
/// role object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberRole {
    Reference(Uuid),
    Embedded(Role),
}

impl MemberRole {
    /// Returns the referenced or embedded role id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Reference(id) => *id,
            Self::Embedded(role) => role.id,
        }
    }
}

/// A user's membership in one organisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organisation_id: Uuid,
    #[serde(default)]
    pub role: Option<MemberRole>,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub extra_permissions: PermissionSet,
}

impl Member {
    /// Creates a non-owner member without a role.
    pub fn new(user_id: Uuid, organisation_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            organisation_id,
            role: None,
            is_owner: false,
            extra_permissions: PermissionSet::new(),
        }
    }

    /// Attaches a role by reference.
    pub fn with_role_id(mut self, role_id: Uuid) -> Self {
        self.role = Some(MemberRole::Reference(role_id));
        self
    }

    /// Attaches a role snapshot.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(MemberRole::Embedded(role));
        self
    }

    /// Sets the owner flag.
    pub fn with_owner(mut self, is_owner: bool) -> Self {
        self.is_owner = is_owner;
        self
    }

    /// Sets organisation-specific extra grants.
    pub fn with_extra_permissions(mut self, extra_permissions: PermissionSet) -> Self {
        self.extra_permissions = extra_permissions;
        self
    }

    /// Returns the id of the member's role, if any.
    pub fn role_id(&self) -> Option<Uuid> {
        self.role.as_ref().map(MemberRole::id)
    }

    /// Resolves effective permissions, looking the role up in `roles`.
    pub fn effective_permissions(&self, roles: &[Role]) -> EffectivePermissions {
        let role = self
            .role_id()
            .and_then(|role_id| roles.iter().find(|role| role.id == role_id));
        EffectivePermissions::resolve(self, role)
    }
}

/// Immutable `(permissions, is_owner)` snapshot every evaluator is built from.
///
/// Owners hold the whole catalog. Everyone else holds the union of their
/// role's permissions and their extra permissions; extra permissions never
/// revoke anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectivePermissions {
    permissions: PermissionSet,
    is_owner: bool,
}

impl EffectivePermissions {
    /// Creates a snapshot from an already-computed set.
    pub fn new(permissions: PermissionSet, is_owner: bool) -> Self {
        let permissions = if is_owner {
            PermissionSet::all()
        } else {
            permissions
        };

        Self {
            permissions,
            is_owner,
        }
    }

    /// Computes the effective set of a member.
    ///
    /// An embedded role snapshot takes precedence over `role`. A referenced
    /// role only contributes when `role` carries the referenced id and
    /// belongs to the member's organisation.
    pub fn resolve(member: &Member, role: Option<&Role>) -> Self {
        if member.is_owner {
            tracing::debug!(
                target: TRACING_TARGET_MODEL,
                member_id = %member.id,
                organisation_id = %member.organisation_id,
                "effective permissions: organisation owner"
            );

            return Self::new(PermissionSet::new(), true);
        }

        let role = match &member.role {
            Some(MemberRole::Embedded(role)) => Some(role),
            Some(MemberRole::Reference(role_id)) => {
                let found = role.filter(|role| role.id == *role_id);
                if found.is_none() {
                    tracing::warn!(
                        target: TRACING_TARGET_MODEL,
                        member_id = %member.id,
                        role_id = %role_id,
                        "referenced role not available, using extra permissions only"
                    );
                }
                found
            }
            None => None,
        };

        let role = role.filter(|role| {
            let same_organisation = role.belongs_to(member.organisation_id);
            if !same_organisation {
                tracing::warn!(
                    target: TRACING_TARGET_MODEL,
                    member_id = %member.id,
                    role_id = %role.id,
                    member_organisation_id = %member.organisation_id,
                    role_organisation_id = %role.organisation_id,
                    "ignoring role from another organisation"
                );
            }
            same_organisation
        });

        let permissions = match role {
            Some(role) => role.permissions.union(&member.extra_permissions),
            None => member.extra_permissions.clone(),
        };

        tracing::debug!(
            target: TRACING_TARGET_MODEL,
            member_id = %member.id,
            role_id = ?role.map(|role| role.id),
            permissions = permissions.len(),
            "effective permissions resolved"
        );

        Self::new(permissions, false)
    }

    /// Returns the effective permission set.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns the owner flag.
    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    /// Builds a permission checker from this snapshot.
    pub fn checker(&self) -> PermissionChecker {
        PermissionChecker::new(self.permissions.clone(), self.is_owner)
    }

    /// Builds an ability from this snapshot.
    pub fn ability(&self) -> AppAbility {
        AppAbility::new(&self.permissions, self.is_owner)
    }
}
