//! Recipe catalog: an on-disk repository of package recipes.
//!
//! A repository holds one directory per package, each containing a
//! `recipe.toml`:
//!
//! ```text
//! recipes/
//! ├── r/
//! │   └── recipe.toml
//! ├── r-affy/
//! │   └── recipe.toml
//! └── r-affydata/
//!     └── recipe.toml
//! ```
//!
//! The catalog is loaded once at startup and is immutable afterwards;
//! resolver threads can share a `&Catalog` freely.

use crate::recipe::{Recipe, RecipeError, RECIPE_FILE};
use crate::version::{Version, VersionError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("recipe repository not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("invalid recipe at {path}: {source}")]
    Recipe { path: PathBuf, source: RecipeError },

    #[error("recipe at {path} declares package '{name}' but lives in directory '{dir}'")]
    NameMismatch {
        path: PathBuf,
        name: String,
        dir: String,
    },

    #[error("duplicate package '{0}'")]
    DuplicatePackage(String),

    #[error("invalid package reference '{reference}': {reason}")]
    InvalidRef { reference: String, reason: String },
}

/// List every recipe file under a repository root, in path order.
///
/// # Errors
///
/// Returns an error if the root does not exist or cannot be globbed.
pub fn recipe_paths(root: impl AsRef<Path>) -> Result<Vec<PathBuf>, CatalogError> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(CatalogError::NotFound(root.to_path_buf()));
    }

    let pattern = root.join("*").join(RECIPE_FILE);
    let mut paths = Vec::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        paths.push(entry.map_err(glob::GlobError::into_error)?);
    }
    paths.sort();
    Ok(paths)
}

/// An immutable collection of recipes keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: BTreeMap<String, Recipe>,
}

impl Catalog {
    /// Load every recipe under a repository root.
    ///
    /// Fails on the first malformed recipe, naming the file. Each
    /// recipe's declared name must match its directory name.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is missing, a recipe is malformed,
    /// or a recipe disagrees with its directory name.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let mut recipes = BTreeMap::new();

        for path in recipe_paths(root)? {
            let recipe = Recipe::from_path(&path).map_err(|source| CatalogError::Recipe {
                path: path.clone(),
                source,
            })?;

            let dir = directory_name(&path);
            if recipe.name() != dir {
                return Err(CatalogError::NameMismatch {
                    path,
                    name: recipe.name().to_string(),
                    dir,
                });
            }

            recipes.insert(recipe.name().to_string(), recipe);
        }

        Ok(Self { recipes })
    }

    /// Build a catalog from already-parsed recipes.
    ///
    /// # Errors
    ///
    /// Returns an error if two recipes share a name.
    pub fn from_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for recipe in recipes {
            let name = recipe.name().to_string();
            if map.insert(name.clone(), recipe).is_some() {
                return Err(CatalogError::DuplicatePackage(name));
            }
        }
        Ok(Self { recipes: map })
    }

    /// Look up a recipe by package name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Recipe> {
        self.recipes.get(name)
    }

    /// Package names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    /// Iterate over all recipes in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.values()
    }

    /// Number of recipes in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// Returns true if the catalog holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// The name of the directory a recipe file lives in.
fn directory_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A parsed `name` or `name@version` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRef {
    name: String,
    version: Option<Version>,
}

impl PackageRef {
    /// Parse a package reference.
    ///
    /// Supported formats:
    /// - `r-affydata` - the package alone
    /// - `r-affydata@1.24.0` - a specific version
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the version label after
    /// `@` is malformed.
    pub fn parse(reference: &str) -> Result<Self, CatalogError> {
        let (name, version) = match reference.split_once('@') {
            Some((name, label)) => {
                if label.is_empty() {
                    return Err(CatalogError::InvalidRef {
                        reference: reference.to_string(),
                        reason: "version after '@' cannot be empty".to_string(),
                    });
                }
                let version =
                    Version::parse(label).map_err(|e: VersionError| CatalogError::InvalidRef {
                        reference: reference.to_string(),
                        reason: e.to_string(),
                    })?;
                (name, Some(version))
            }
            None => (reference, None),
        };

        if name.is_empty() {
            return Err(CatalogError::InvalidRef {
                reference: reference.to_string(),
                reason: "package name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }

    /// The package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The requested version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }
}

impl std::fmt::Display for PackageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref version) = self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const AFFYDATA: &str = r#"
[package]
name = "r-affydata"
url = "https://example.org/affydata_{version}.tar.gz"

[[version]]
id = "1.24.0"
md5 = "0b6938685c450a56d65dd5628ebed42d"

[[dependency]]
package = "r-affy"
"#;

    const AFFY: &str = r#"
[package]
name = "r-affy"
url = "https://example.org/affy_{version}.tar.gz"
"#;

    fn write_recipe(root: &Path, dir: &str, content: &str) {
        let package_dir = root.join(dir);
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(package_dir.join(RECIPE_FILE), content).unwrap();
    }

    #[test]
    fn load_repository() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "r-affydata", AFFYDATA);
        write_recipe(tmp.path(), "r-affy", AFFY);

        let catalog = Catalog::load(tmp.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("r-affydata").is_some());
        assert!(catalog.get("r-affy").is_some());
        assert!(catalog.get("r").is_none());

        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["r-affy", "r-affydata"]);
    }

    #[test]
    fn load_missing_repository() {
        let tmp = TempDir::new().unwrap();
        let result = Catalog::load(tmp.path().join("nope"));
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn load_reports_malformed_recipe_with_path() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "r-affy", "this is not toml = [");

        let err = Catalog::load(tmp.path()).unwrap_err();
        match err {
            CatalogError::Recipe { path, .. } => {
                assert!(path.ends_with("r-affy/recipe.toml"));
            }
            other => panic!("expected Recipe error, got {other:?}"),
        }
    }

    #[test]
    fn load_rejects_directory_name_mismatch() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "wrong-dir", AFFY);

        let err = Catalog::load(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::NameMismatch { name, dir, .. }
                if name == "r-affy" && dir == "wrong-dir"
        ));
    }

    #[test]
    fn load_ignores_stray_files() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "r-affy", AFFY);
        fs::write(tmp.path().join("README.md"), "notes").unwrap();

        let catalog = Catalog::load(tmp.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn from_recipes_rejects_duplicates() {
        let a = Recipe::parse(AFFY).unwrap();
        let b = Recipe::parse(AFFY).unwrap();
        let err = Catalog::from_recipes([a, b]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicatePackage(name) if name == "r-affy"));
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::from_recipes([]).unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn parse_ref_name_only() {
        let reference = PackageRef::parse("r-affydata").unwrap();
        assert_eq!(reference.name(), "r-affydata");
        assert!(reference.version().is_none());
    }

    #[test]
    fn parse_ref_with_version() {
        let reference = PackageRef::parse("r-affydata@1.24.0").unwrap();
        assert_eq!(reference.name(), "r-affydata");
        assert_eq!(reference.version().unwrap().as_str(), "1.24.0");
        assert_eq!(reference.to_string(), "r-affydata@1.24.0");
    }

    #[test]
    fn parse_ref_rejects_empty_parts() {
        assert!(PackageRef::parse("").is_err());
        assert!(PackageRef::parse("@1.0").is_err());
        assert!(PackageRef::parse("r-affydata@").is_err());
    }
}
