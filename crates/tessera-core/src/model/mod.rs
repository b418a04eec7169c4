//! Role and membership records consumed by the evaluators.

mod default_role;
mod member;
mod permission_set;
mod role;

pub use self::default_role::DefaultRole;
pub use self::member::{EffectivePermissions, Member, MemberRole};
pub use self::permission_set::PermissionSet;
pub use self::role::{Role, slugify};
