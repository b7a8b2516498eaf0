//! Recipe model and catalog for the Retort package manager.
//!
//! This crate provides:
//! - Parsing and validation of `recipe.toml` package records
//! - Version labels and inclusive version ranges
//! - Expected source-archive checksums (MD5, SHA-256)
//! - Catalog loading for whole recipe repositories
//!
//! Dependency resolution, fetching, and building live elsewhere; this
//! crate only serves the declarative data those steps consume.

mod catalog;
mod checksum;
mod recipe;
mod version;

pub use catalog::{recipe_paths, Catalog, CatalogError, PackageRef};
pub use checksum::{Checksum, ChecksumError};
pub use recipe::{
    DependencyDecl, Recipe, RecipeError, Scope, ScopeSet, VersionDecl, RECIPE_FILE,
    VERSION_PLACEHOLDER,
};
pub use version::{Version, VersionError, VersionRange};
