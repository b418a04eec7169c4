//! `tessera catalog`.

use std::fmt;

use serde::Serialize;
use tessera_core::PermissionCategory;

/// The permission catalog grouped by category.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CatalogReport {
    categories: Vec<PermissionCategory>,
}

impl CatalogReport {
    pub fn build() -> Self {
        Self {
            categories: PermissionCategory::all(),
        }
    }
}

impl fmt::Display for CatalogReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, category) in self.categories.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{category}")?;
        }
        Ok(())
    }
}
