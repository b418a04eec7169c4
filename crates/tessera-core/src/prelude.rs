//! Convenient re-exports for common use.

pub use crate::ability::{Action, AppAbility, EffectiveCapability, Subject, define_ability_for};
pub use crate::checker::{PermissionChecker, create_permission_checker};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::guard::{Capability, Guard, GuardDecision, Requirement};
pub use crate::model::{DefaultRole, EffectivePermissions, Member, MemberRole, PermissionSet, Role};
pub use crate::permission::{Category, Permission, PermissionCategory, is_valid_permission};
