//! Roles seeded into every new organisation.

use strum::{Display, EnumIter, IntoEnumIterator};
use uuid::Uuid;

use super::{PermissionSet, Role};
use crate::permission::Permission;

/// System roles created alongside an organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DefaultRole {
    /// Everything except deleting the organisation and billing.
    Administrator,
    /// Day-to-day operations without role or organisation administration.
    Manager,
    /// Read access plus opening tickets. Assigned to new members.
    Member,
}

impl DefaultRole {
    /// Checks if this role grants the permission.
    pub const fn grants(self, permission: Permission) -> bool {
        use Permission::*;

        match self {
            Self::Administrator => !matches!(permission, DeleteOrganisation | ManageBilling),
            Self::Manager => {
                permission.is_read_only()
                    || matches!(
                        permission,
                        AddMembers
                            | CreateTickets
                            | EditTickets
                            | DeleteTickets
                            | AssignTickets
                            | CreateEmployees
                            | EditEmployees
                            | DeleteEmployees
                            | CreateBranches
                            | EditBranches
                            | DeleteBranches
                            | CreateDepartments
                            | EditDepartments
                            | DeleteDepartments
                            | ConnectIntegrations
                            | CreatePosts
                            | EditPosts
                            | DeletePosts
                            | SchedulePosts
                    )
            }
            Self::Member => matches!(
                permission,
                ViewOrganisation
                    | ViewMembers
                    | ViewTickets
                    | CreateTickets
                    | ViewEmployees
                    | ViewBranches
                    | ViewDepartments
                    | ViewPosts
            ),
        }
    }

    /// Returns every permission granted by this role.
    pub fn permissions(self) -> PermissionSet {
        Permission::iter()
            .filter(|permission| self.grants(*permission))
            .collect()
    }

    /// Returns true for the role assigned to members without an explicit role.
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Member)
    }

    /// Materialises the role for an organisation.
    pub fn into_role(self, organisation_id: Uuid) -> Role {
        Role::new(organisation_id, self.to_string(), self.permissions())
            .with_system(true)
            .with_default(self.is_default())
    }

    /// Materialises every system role for a new organisation.
    pub fn seed(organisation_id: Uuid) -> Vec<Role> {
        Self::iter()
            .map(|role| role.into_role(organisation_id))
            .collect()
    }
}
