//! Action/subject vocabulary and the permission-to-pair mapping.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::permission::Permission;

/// Coarse-grained verb a rule grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Assign,
    Bill,
    Connect,
    Disconnect,
    Schedule,
}

/// Resource kind a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Subject {
    Organisation,
    Member,
    Role,
    Ticket,
    Employee,
    Branch,
    Department,
    Integration,
    Post,
}

/// Resolves a raw permission string to the action/subject pair it grants.
///
/// Total over all inputs: anything outside the catalog, including
/// well-formed but unregistered keys, yields `None`.
///
/// ```
/// use tessera_core::ability::{Action, Subject, parse_permission};
///
/// assert_eq!(parse_permission("ticket:edit"), Some((Action::Update, Subject::Ticket)));
/// assert_eq!(parse_permission("not:a:real:permission"), None);
/// ```
#[must_use]
pub fn parse_permission(raw: &str) -> Option<(Action, Subject)> {
    Permission::parse(raw).map(Permission::action_subject)
}

/// Returns the permission granting the given pair, if any.
pub fn permission_for(action: Action, subject: Subject) -> Option<Permission> {
    use strum::IntoEnumIterator;

    Permission::iter().find(|permission| permission.action_subject() == (action, subject))
}
