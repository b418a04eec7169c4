//! Organisation roles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PermissionSet;
use crate::permission::Permission;

/// Named bundle of permissions assignable to members of one organisation.
///
/// Evaluators only ever read roles; editing happens in the role-management
/// layer, which stores the result and rebuilds evaluators afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub permissions: PermissionSet,
    /// Assigned to new members when no role is chosen.
    #[serde(default)]
    pub is_default: bool,
    /// Created with the organisation and not deletable.
    #[serde(default)]
    pub is_system: bool,
    pub organisation_id: Uuid,
}

impl Role {
    /// Creates a custom role, deriving the slug from the name.
    pub fn new(organisation_id: Uuid, name: impl Into<String>, permissions: PermissionSet) -> Self {
        let name = name.into();
        Self {
            id: Uuid::now_v7(),
            slug: slugify(&name),
            name,
            permissions,
            is_default: false,
            is_system: false,
            organisation_id,
        }
    }

    /// Marks the role as the organisation default.
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// Marks the role as system-managed.
    pub fn with_system(mut self, is_system: bool) -> Self {
        self.is_system = is_system;
        self
    }

    /// Returns true if the role grants the permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns true if the role belongs to the organisation.
    pub fn belongs_to(&self, organisation_id: Uuid) -> bool {
        self.organisation_id == organisation_id
    }
}

/// Turns a display name into a URL-safe slug: `"Support Lead (EU)"` becomes
/// `"support-lead-eu"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Support Lead (EU)"), "support-lead-eu");
        assert_eq!(slugify("  HR -- Manager "), "hr-manager");
        assert_eq!(slugify("Admin"), "admin");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_new_role() {
        let organisation_id = Uuid::new_v4();
        let permissions: PermissionSet = [Permission::ViewTickets].into_iter().collect();
        let role = Role::new(organisation_id, "Helpdesk Agent", permissions);

        assert_eq!(role.slug, "helpdesk-agent");
        assert!(role.belongs_to(organisation_id));
        assert!(role.has_permission(Permission::ViewTickets));
        assert!(!role.has_permission(Permission::EditTickets));
        assert!(!role.is_default && !role.is_system);
    }

    #[test]
    fn test_role_document_deserialization() {
        let json = r#"{
            "id": "7f1c3a9e-5b2d-4c8e-9a1f-2d3e4f5a6b7c",
            "name": "Agent",
            "slug": "agent",
            "permissions": ["ticket:view", "ticket:edit", "ticket:archive"],
            "isDefault": true,
            "organisationId": "0b6f5e4d-3c2b-4a19-8f7e-6d5c4b3a2910"
        }"#;

        let role: Role = serde_json::from_str(json).unwrap();
        assert_eq!(role.permissions.keys(), ["ticket:view", "ticket:edit"]);
        assert!(role.is_default);
        assert!(!role.is_system);
    }
}
