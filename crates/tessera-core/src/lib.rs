#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

//! # Tessera Core
//!
//! Permission catalog, action/subject mapping, ability builder and
//! permission checker for organisation members. Every evaluator is a pure,
//! immutable value built from an effective permission set and an owner flag.

/// Tracing target for ability construction.
pub const TRACING_TARGET_ABILITY: &str = "tessera_core::ability";

/// Tracing target for permission checker construction.
pub const TRACING_TARGET_CHECKER: &str = "tessera_core::checker";

/// Tracing target for guard evaluation.
pub const TRACING_TARGET_GUARD: &str = "tessera_core::guard";

/// Tracing target for role and member resolution.
pub const TRACING_TARGET_MODEL: &str = "tessera_core::model";

mod error;

pub mod ability;
pub mod checker;
pub mod guard;
pub mod model;
pub mod permission;
pub mod prelude;

// Re-export key types for convenience
pub use ability::{AppAbility, define_ability_for, parse_permission};
pub use checker::{PermissionChecker, create_permission_checker};
pub use error::{Error, ErrorKind, Result};
pub use permission::{Permission, PermissionCategory, is_valid_permission};
