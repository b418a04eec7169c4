//! Ordered set of catalog permissions.

use std::collections::BTreeSet;

use derive_more::Deref;
use serde::{Deserialize, Deserializer, Serialize};
use strum::IntoEnumIterator;

use crate::TRACING_TARGET_MODEL;
use crate::error::Result;
use crate::permission::{Permission, try_parse_permission};

/// Set of permissions held by a role, a member or an effective snapshot.
///
/// Deserialization is lenient: keys that are no longer part of the catalog
/// are dropped with a warning so stale role documents still load. Use
/// [`PermissionSet::try_from_strs`] where unknown keys must be rejected.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Deref, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding the whole catalog.
    pub fn all() -> Self {
        Permission::iter().collect()
    }

    /// Parses raw keys, keeping the known ones and returning the rest.
    pub fn from_strs_lossy<I, S>(raw: I) -> (Self, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        let mut unknown = Vec::new();
        for key in raw {
            let key = key.as_ref();
            match Permission::parse(key) {
                Some(permission) => {
                    set.insert(permission);
                }
                None => unknown.push(key.to_owned()),
            }
        }

        (Self(set), unknown)
    }

    /// Parses raw keys, failing on the first key outside the catalog.
    pub fn try_from_strs<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .map(|key| try_parse_permission(key.as_ref()))
            .collect()
    }

    /// Adds a permission, returning true if it was not present.
    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, permission: Permission) -> Self {
        self.insert(permission);
        self
    }

    /// Returns the union of both sets.
    pub fn union(&self, other: &Self) -> Self {
        self.0.union(&other.0).copied().collect()
    }

    /// Returns true if every permission of `other` is in this set.
    pub fn includes(&self, other: &Self) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Returns the catalog keys in catalog order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.0.iter().map(|permission| permission.as_str()).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Permission> for PermissionSet {
    fn extend<T: IntoIterator<Item = Permission>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for PermissionSet {
    type IntoIter = std::collections::btree_set::IntoIter<Permission>;
    type Item = Permission;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Permission>>;
    type Item = Permission;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        let (set, unknown) = Self::from_strs_lossy(&raw);
        if !unknown.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET_MODEL,
                unknown = ?unknown,
                "dropping permissions missing from the catalog"
            );
        }

        Ok(set)
    }
}
