//! Permission catalog.
//!
//! Every capability that can be granted to an organisation member is a
//! variant of the closed [`Permission`] enumeration. Raw `resource:action`
//! strings only exist at the boundary (persisted role documents, API
//! payloads) and are turned into [`Permission`] values through
//! [`Permission::parse`] or [`FromStr`].
//!
//! The catalog is also grouped into [`PermissionCategory`] values, which are
//! used to render permission-selection screens.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::ability::{Action, Subject};
use crate::error::{Error, Result};

/// Granular organisation permissions.
///
/// The string form of each variant is its canonical catalog key, for example
/// `ticket:view` or `organisation:billing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, EnumCount, EnumIter, EnumString, IntoStaticStr)]
pub enum Permission {
    // Organisation
    /// Can view organisation details.
    #[strum(to_string = "organisation:view")]
    ViewOrganisation,
    /// Can update organisation details.
    #[strum(to_string = "organisation:edit")]
    EditOrganisation,
    /// Can delete the organisation.
    #[strum(to_string = "organisation:delete")]
    DeleteOrganisation,
    /// Can manage plans, invoices and payment methods.
    #[strum(to_string = "organisation:billing")]
    ManageBilling,

    // Members
    /// Can list organisation members.
    #[strum(to_string = "member:view")]
    ViewMembers,
    /// Can invite or add members.
    #[strum(to_string = "member:add")]
    AddMembers,
    /// Can change a member's role and extra permissions.
    #[strum(to_string = "member:edit")]
    EditMembers,
    /// Can remove members from the organisation.
    #[strum(to_string = "member:remove")]
    RemoveMembers,

    // Roles & permissions
    /// Can list roles and their permissions.
    #[strum(to_string = "role:view")]
    ViewRoles,
    /// Can create custom roles.
    #[strum(to_string = "role:create")]
    CreateRoles,
    /// Can edit roles.
    #[strum(to_string = "role:edit")]
    EditRoles,
    /// Can delete roles.
    #[strum(to_string = "role:delete")]
    DeleteRoles,

    // Tickets
    /// Can view helpdesk tickets.
    #[strum(to_string = "ticket:view")]
    ViewTickets,
    /// Can open tickets.
    #[strum(to_string = "ticket:create")]
    CreateTickets,
    /// Can edit and reply to tickets.
    #[strum(to_string = "ticket:edit")]
    EditTickets,
    /// Can delete tickets.
    #[strum(to_string = "ticket:delete")]
    DeleteTickets,
    /// Can assign tickets to agents.
    #[strum(to_string = "ticket:assign")]
    AssignTickets,

    // Employees
    /// Can view employee records.
    #[strum(to_string = "employee:view")]
    ViewEmployees,
    /// Can onboard employees.
    #[strum(to_string = "employee:create")]
    CreateEmployees,
    /// Can edit employee records.
    #[strum(to_string = "employee:edit")]
    EditEmployees,
    /// Can delete employee records.
    #[strum(to_string = "employee:delete")]
    DeleteEmployees,

    // Branches
    /// Can view branches.
    #[strum(to_string = "branch:view")]
    ViewBranches,
    /// Can create branches.
    #[strum(to_string = "branch:create")]
    CreateBranches,
    /// Can edit branches.
    #[strum(to_string = "branch:edit")]
    EditBranches,
    /// Can delete branches.
    #[strum(to_string = "branch:delete")]
    DeleteBranches,

    // Departments
    /// Can view departments.
    #[strum(to_string = "department:view")]
    ViewDepartments,
    /// Can create departments.
    #[strum(to_string = "department:create")]
    CreateDepartments,
    /// Can edit departments.
    #[strum(to_string = "department:edit")]
    EditDepartments,
    /// Can delete departments.
    #[strum(to_string = "department:delete")]
    DeleteDepartments,

    // Integrations
    /// Can view connected integrations.
    #[strum(to_string = "integration:view")]
    ViewIntegrations,
    /// Can connect new integrations (mailboxes, social accounts).
    #[strum(to_string = "integration:connect")]
    ConnectIntegrations,
    /// Can disconnect integrations.
    #[strum(to_string = "integration:disconnect")]
    DisconnectIntegrations,

    // Posts
    /// Can view social posts.
    #[strum(to_string = "post:view")]
    ViewPosts,
    /// Can draft social posts.
    #[strum(to_string = "post:create")]
    CreatePosts,
    /// Can edit social posts.
    #[strum(to_string = "post:edit")]
    EditPosts,
    /// Can delete social posts.
    #[strum(to_string = "post:delete")]
    DeletePosts,
    /// Can schedule posts for publishing.
    #[strum(to_string = "post:schedule")]
    SchedulePosts,
}

impl Permission {
    /// Every permission in catalog order.
    pub const ALL: [Permission; <Permission as EnumCount>::COUNT] = [
        Self::ViewOrganisation,
        Self::EditOrganisation,
        Self::DeleteOrganisation,
        Self::ManageBilling,
        Self::ViewMembers,
        Self::AddMembers,
        Self::EditMembers,
        Self::RemoveMembers,
        Self::ViewRoles,
        Self::CreateRoles,
        Self::EditRoles,
        Self::DeleteRoles,
        Self::ViewTickets,
        Self::CreateTickets,
        Self::EditTickets,
        Self::DeleteTickets,
        Self::AssignTickets,
        Self::ViewEmployees,
        Self::CreateEmployees,
        Self::EditEmployees,
        Self::DeleteEmployees,
        Self::ViewBranches,
        Self::CreateBranches,
        Self::EditBranches,
        Self::DeleteBranches,
        Self::ViewDepartments,
        Self::CreateDepartments,
        Self::EditDepartments,
        Self::DeleteDepartments,
        Self::ViewIntegrations,
        Self::ConnectIntegrations,
        Self::DisconnectIntegrations,
        Self::ViewPosts,
        Self::CreatePosts,
        Self::EditPosts,
        Self::DeletePosts,
        Self::SchedulePosts,
    ];

    /// Parses a raw permission string, returning `None` when it is not part
    /// of the catalog.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    /// Returns the canonical `resource:action` key.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Returns the resource part of the key.
    #[must_use]
    pub fn resource(self) -> &'static str {
        let key = self.as_str();
        key.split_once(':').map_or(key, |(resource, _)| resource)
    }

    /// Returns the action/subject pair this permission grants.
    ///
    /// The table is injective: no two permissions share a pair.
    #[must_use]
    pub const fn action_subject(self) -> (Action, Subject) {
        use Action::{Assign, Bill, Connect, Create, Delete, Disconnect, Read, Schedule, Update};

        match self {
            Self::ViewOrganisation => (Read, Subject::Organisation),
            Self::EditOrganisation => (Update, Subject::Organisation),
            Self::DeleteOrganisation => (Delete, Subject::Organisation),
            Self::ManageBilling => (Bill, Subject::Organisation),

            Self::ViewMembers => (Read, Subject::Member),
            Self::AddMembers => (Create, Subject::Member),
            Self::EditMembers => (Update, Subject::Member),
            Self::RemoveMembers => (Delete, Subject::Member),

            Self::ViewRoles => (Read, Subject::Role),
            Self::CreateRoles => (Create, Subject::Role),
            Self::EditRoles => (Update, Subject::Role),
            Self::DeleteRoles => (Delete, Subject::Role),

            Self::ViewTickets => (Read, Subject::Ticket),
            Self::CreateTickets => (Create, Subject::Ticket),
            Self::EditTickets => (Update, Subject::Ticket),
            Self::DeleteTickets => (Delete, Subject::Ticket),
            Self::AssignTickets => (Assign, Subject::Ticket),

            Self::ViewEmployees => (Read, Subject::Employee),
            Self::CreateEmployees => (Create, Subject::Employee),
            Self::EditEmployees => (Update, Subject::Employee),
            Self::DeleteEmployees => (Delete, Subject::Employee),

            Self::ViewBranches => (Read, Subject::Branch),
            Self::CreateBranches => (Create, Subject::Branch),
            Self::EditBranches => (Update, Subject::Branch),
            Self::DeleteBranches => (Delete, Subject::Branch),

            Self::ViewDepartments => (Read, Subject::Department),
            Self::CreateDepartments => (Create, Subject::Department),
            Self::EditDepartments => (Update, Subject::Department),
            Self::DeleteDepartments => (Delete, Subject::Department),

            Self::ViewIntegrations => (Read, Subject::Integration),
            Self::ConnectIntegrations => (Connect, Subject::Integration),
            Self::DisconnectIntegrations => (Disconnect, Subject::Integration),

            Self::ViewPosts => (Read, Subject::Post),
            Self::CreatePosts => (Create, Subject::Post),
            Self::EditPosts => (Update, Subject::Post),
            Self::DeletePosts => (Delete, Subject::Post),
            Self::SchedulePosts => (Schedule, Subject::Post),
        }
    }

    /// Returns the category this permission is listed under.
    #[must_use]
    pub const fn category(self) -> Category {
        match self.action_subject().1 {
            Subject::Organisation => Category::Organisation,
            Subject::Member => Category::Members,
            Subject::Role => Category::Roles,
            Subject::Ticket => Category::Tickets,
            Subject::Employee => Category::Employees,
            Subject::Branch => Category::Branches,
            Subject::Department => Category::Departments,
            Subject::Integration => Category::Integrations,
            Subject::Post => Category::Posts,
        }
    }

    /// Returns the short label shown next to the permission toggle.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewOrganisation => "View organisation",
            Self::EditOrganisation => "Edit organisation",
            Self::DeleteOrganisation => "Delete organisation",
            Self::ManageBilling => "Manage billing",
            Self::ViewMembers => "View members",
            Self::AddMembers => "Add members",
            Self::EditMembers => "Edit members",
            Self::RemoveMembers => "Remove members",
            Self::ViewRoles => "View roles",
            Self::CreateRoles => "Create roles",
            Self::EditRoles => "Edit roles",
            Self::DeleteRoles => "Delete roles",
            Self::ViewTickets => "View tickets",
            Self::CreateTickets => "Create tickets",
            Self::EditTickets => "Edit tickets",
            Self::DeleteTickets => "Delete tickets",
            Self::AssignTickets => "Assign tickets",
            Self::ViewEmployees => "View employees",
            Self::CreateEmployees => "Add employees",
            Self::EditEmployees => "Edit employees",
            Self::DeleteEmployees => "Delete employees",
            Self::ViewBranches => "View branches",
            Self::CreateBranches => "Create branches",
            Self::EditBranches => "Edit branches",
            Self::DeleteBranches => "Delete branches",
            Self::ViewDepartments => "View departments",
            Self::CreateDepartments => "Create departments",
            Self::EditDepartments => "Edit departments",
            Self::DeleteDepartments => "Delete departments",
            Self::ViewIntegrations => "View integrations",
            Self::ConnectIntegrations => "Connect integrations",
            Self::DisconnectIntegrations => "Disconnect integrations",
            Self::ViewPosts => "View posts",
            Self::CreatePosts => "Create posts",
            Self::EditPosts => "Edit posts",
            Self::DeletePosts => "Delete posts",
            Self::SchedulePosts => "Schedule posts",
        }
    }

    /// Returns a one-sentence description of what the permission allows.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::ViewOrganisation => "Can view organisation details.",
            Self::EditOrganisation => "Can update organisation details.",
            Self::DeleteOrganisation => "Can delete the organisation.",
            Self::ManageBilling => "Can manage plans, invoices and payment methods.",
            Self::ViewMembers => "Can list organisation members.",
            Self::AddMembers => "Can invite or add members.",
            Self::EditMembers => "Can change a member's role and extra permissions.",
            Self::RemoveMembers => "Can remove members from the organisation.",
            Self::ViewRoles => "Can list roles and their permissions.",
            Self::CreateRoles => "Can create custom roles.",
            Self::EditRoles => "Can edit roles.",
            Self::DeleteRoles => "Can delete roles.",
            Self::ViewTickets => "Can view helpdesk tickets.",
            Self::CreateTickets => "Can open tickets.",
            Self::EditTickets => "Can edit and reply to tickets.",
            Self::DeleteTickets => "Can delete tickets.",
            Self::AssignTickets => "Can assign tickets to agents.",
            Self::ViewEmployees => "Can view employee records.",
            Self::CreateEmployees => "Can onboard employees.",
            Self::EditEmployees => "Can edit employee records.",
            Self::DeleteEmployees => "Can delete employee records.",
            Self::ViewBranches => "Can view branches.",
            Self::CreateBranches => "Can create branches.",
            Self::EditBranches => "Can edit branches.",
            Self::DeleteBranches => "Can delete branches.",
            Self::ViewDepartments => "Can view departments.",
            Self::CreateDepartments => "Can create departments.",
            Self::EditDepartments => "Can edit departments.",
            Self::DeleteDepartments => "Can delete departments.",
            Self::ViewIntegrations => "Can view connected integrations.",
            Self::ConnectIntegrations => "Can connect new integrations (mailboxes, social accounts).",
            Self::DisconnectIntegrations => "Can disconnect integrations.",
            Self::ViewPosts => "Can view social posts.",
            Self::CreatePosts => "Can draft social posts.",
            Self::EditPosts => "Can edit social posts.",
            Self::DeletePosts => "Can delete social posts.",
            Self::SchedulePosts => "Can schedule posts for publishing.",
        }
    }

    /// Returns true if this is a read-only permission that doesn't modify anything.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self.action_subject().0, Action::Read)
    }
}

impl Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::from_str(&raw).map_err(|_| de::Error::custom(format!("unknown permission `{raw}`")))
    }
}

/// Parses a raw string strictly, reporting unknown keys as errors.
pub fn try_parse_permission(raw: &str) -> Result<Permission> {
    Permission::from_str(raw).map_err(|err| Error::invalid_permission(raw).with_source(err))
}

/// Returns true iff `raw` is a key of the permission catalog.
#[must_use]
pub fn is_valid_permission(raw: &str) -> bool {
    Permission::parse(raw).is_some()
}

/// Returns every permission in catalog order.
#[must_use]
pub fn all_permissions() -> Vec<Permission> {
    Permission::ALL.to_vec()
}

/// Presentation group of related permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, EnumIter, IntoStaticStr, Serialize, Deserialize)]
pub enum Category {
    /// Organisation settings, deletion and billing.
    #[strum(to_string = "Organisation")]
    Organisation,
    /// Organisation membership.
    #[strum(to_string = "Members")]
    Members,
    /// Custom roles and their permissions.
    #[strum(to_string = "Roles & Permissions")]
    Roles,
    /// Helpdesk tickets.
    #[strum(to_string = "Tickets")]
    Tickets,
    /// Employee records.
    #[strum(to_string = "Employees")]
    Employees,
    /// Organisation branches.
    #[strum(to_string = "Branches")]
    Branches,
    /// Organisation departments.
    #[strum(to_string = "Departments")]
    Departments,
    /// Connected mailboxes and social accounts.
    #[strum(to_string = "Integrations")]
    Integrations,
    /// Social media posts.
    #[strum(to_string = "Posts")]
    Posts,
}

/// A single `{ key, label }` row of a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionEntry {
    /// The permission, serialized as its catalog key.
    pub key: Permission,
    /// Short label shown next to the permission toggle.
    pub label: &'static str,
}

impl From<Permission> for PermissionEntry {
    fn from(key: Permission) -> Self {
        Self {
            key,
            label: key.label(),
        }
    }
}

/// Named, ordered group of permissions for permission-selection screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionCategory {
    /// The category being listed.
    pub category: Category,
    /// Display name of the category.
    pub name: &'static str,
    /// Entries of the category in catalog order.
    pub permissions: Vec<PermissionEntry>,
}

impl PermissionCategory {
    /// Builds the entries of one category in catalog order.
    pub fn new(category: Category) -> Self {
        let permissions = Permission::iter()
            .filter(|permission| permission.category() == category)
            .map(PermissionEntry::from)
            .collect();

        Self {
            category,
            name: category.into(),
            permissions,
        }
    }

    /// Returns every category, each with its entries, in display order.
    pub fn all() -> Vec<Self> {
        Category::iter().map(Self::new).collect()
    }

    /// Returns true if the category lists the given permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|entry| entry.key == permission)
    }
}

impl fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for entry in &self.permissions {
            writeln!(f, "  {:<26} {}", entry.key.as_str(), entry.label)?;
        }
        Ok(())
    }
}
