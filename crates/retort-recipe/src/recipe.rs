//! Package recipe (`recipe.toml`) parsing and validation.
//!
//! A recipe is the declarative record for one installable package: where
//! its source archives live, which versions exist and what they must
//! hash to, and which other packages it needs at build or run time. The
//! record is parsed once, validated fail-fast, and never mutated; the
//! resolver and builder only ever read from it.

use crate::checksum::{Checksum, ChecksumError};
use crate::version::{Version, VersionError, VersionRange};
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;
use thiserror::Error;

/// The recipe filename within a package directory.
pub const RECIPE_FILE: &str = "recipe.toml";

/// Placeholder substituted by [`Recipe::url_for`].
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Errors that can occur when loading a recipe.
#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("failed to read recipe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse recipe: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid package name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("invalid source url '{url}': {reason}")]
    InvalidUrl { url: String, reason: &'static str },

    #[error("invalid version '{id}': {source}")]
    InvalidVersion { id: String, source: VersionError },

    #[error("duplicate version '{0}'")]
    DuplicateVersion(String),

    #[error("version '{id}': {source}")]
    InvalidChecksum {
        id: String,
        source: ChecksumError,
    },

    #[error("version '{0}' declares no checksum, expected `md5` or `sha256`")]
    MissingChecksum(String),

    #[error("version '{0}' declares more than one checksum")]
    AmbiguousChecksum(String),

    #[error("dependency '{0}' has an empty scope list")]
    EmptyScope(String),

    #[error("dependency '{package}' has an invalid `{field}` range '{range}': {source}")]
    InvalidRange {
        package: String,
        field: &'static str,
        range: String,
        source: VersionError,
    },
}

/// Whether a dependency edge participates in the build-time or run-time
/// environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Needed to build the package from source.
    Build,
    /// Needed once the package is installed.
    Run,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Run => write!(f, "run"),
        }
    }
}

/// A non-empty subset of `{build, run}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeSet {
    build: bool,
    run: bool,
}

impl ScopeSet {
    /// Both build and run, the default for an unscoped dependency.
    pub const BOTH: Self = Self {
        build: true,
        run: true,
    };

    /// Build a scope set from a list of tags. Returns `None` for an
    /// empty list; duplicates are harmless.
    #[must_use]
    pub fn from_scopes(scopes: &[Scope]) -> Option<Self> {
        if scopes.is_empty() {
            return None;
        }
        let mut set = Self {
            build: false,
            run: false,
        };
        for scope in scopes {
            match scope {
                Scope::Build => set.build = true,
                Scope::Run => set.run = true,
            }
        }
        Some(set)
    }

    /// Check whether the set contains a scope.
    #[must_use]
    pub fn contains(self, scope: Scope) -> bool {
        match scope {
            Scope::Build => self.build,
            Scope::Run => self.run,
        }
    }

    /// The contained scopes in canonical order.
    #[must_use]
    pub fn to_vec(self) -> Vec<Scope> {
        let mut scopes = Vec::new();
        if self.build {
            scopes.push(Scope::Build);
        }
        if self.run {
            scopes.push(Scope::Run);
        }
        scopes
    }
}

impl std::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tags: Vec<String> = self.to_vec().iter().map(ToString::to_string).collect();
        write!(f, "{}", tags.join("+"))
    }
}

impl Serialize for ScopeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.to_vec())
    }
}

/// A declared version and the digest its source archive must match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDecl {
    version: Version,
    checksum: Checksum,
}

impl VersionDecl {
    /// The version label.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The expected source-archive checksum.
    #[must_use]
    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }
}

/// A declared dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyDecl {
    package: String,
    scope: ScopeSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    when: Option<VersionRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    require: Option<VersionRange>,
}

impl DependencyDecl {
    /// Name of the package this edge points at.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The environments this edge participates in.
    #[must_use]
    pub fn scope(&self) -> ScopeSet {
        self.scope
    }

    /// Restriction on the declaring package's own version: the edge only
    /// applies when the declaring package is inside this range.
    #[must_use]
    pub fn when(&self) -> Option<&VersionRange> {
        self.when.as_ref()
    }

    /// Constraint on the dependency's version, passed through to the
    /// resolver untouched.
    #[must_use]
    pub fn require(&self) -> Option<&VersionRange> {
        self.require.as_ref()
    }

    /// Check whether this edge applies when the declaring package is at
    /// the given version. Edges without a `when` range always apply.
    #[must_use]
    pub fn applies_to(&self, version: &Version) -> bool {
        self.when.as_ref().map_or(true, |range| range.contains(version))
    }
}

/// A validated, immutable package record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage: Option<String>,
    url: String,
    versions: Vec<VersionDecl>,
    dependencies: Vec<DependencyDecl>,
}

impl Recipe {
    /// Load a recipe from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// recipe.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RecipeError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a recipe from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending field if the TOML is
    /// invalid or any declaration is malformed.
    pub fn parse(content: &str) -> Result<Self, RecipeError> {
        let raw: RawRecipe = toml::from_str(content)?;
        Self::from_raw(raw)
    }

    /// The unique package name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Informational description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Informational homepage URL.
    #[must_use]
    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    /// The source URL template, containing the `{version}` placeholder.
    #[must_use]
    pub fn url_template(&self) -> &str {
        &self.url
    }

    /// The concrete source URL for a version.
    #[must_use]
    pub fn url_for(&self, version: &Version) -> String {
        self.url.replace(VERSION_PLACEHOLDER, version.as_str())
    }

    /// Declared versions, in declaration order.
    #[must_use]
    pub fn versions(&self) -> &[VersionDecl] {
        &self.versions
    }

    /// Check whether a version is declared.
    #[must_use]
    pub fn has_version(&self, version: &Version) -> bool {
        self.versions.iter().any(|decl| decl.version == *version)
    }

    /// The expected checksum for a declared version.
    #[must_use]
    pub fn checksum_for(&self, version: &Version) -> Option<&Checksum> {
        self.versions
            .iter()
            .find(|decl| decl.version == *version)
            .map(VersionDecl::checksum)
    }

    /// All declared dependency edges, in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyDecl] {
        &self.dependencies
    }

    /// The dependency edges that apply when this package is at the given
    /// version.
    pub fn dependencies_for<'a>(
        &'a self,
        version: &'a Version,
    ) -> impl Iterator<Item = &'a DependencyDecl> {
        self.dependencies
            .iter()
            .filter(move |dep| dep.applies_to(version))
    }

    /// The applicable dependency edges that participate in the given
    /// environment.
    pub fn dependencies_in_scope<'a>(
        &'a self,
        version: &'a Version,
        scope: Scope,
    ) -> impl Iterator<Item = &'a DependencyDecl> {
        self.dependencies_for(version)
            .filter(move |dep| dep.scope.contains(scope))
    }

    /// Serialize the recipe back to TOML. Reparsing the output yields an
    /// identical record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&self.to_raw())
    }

    fn from_raw(raw: RawRecipe) -> Result<Self, RecipeError> {
        validate_name(&raw.package.name)?;
        validate_url(&raw.package.url)?;

        let mut versions: Vec<VersionDecl> = Vec::with_capacity(raw.versions.len());
        for decl in raw.versions {
            let version =
                Version::parse(&decl.id).map_err(|source| RecipeError::InvalidVersion {
                    id: decl.id.clone(),
                    source,
                })?;
            if versions.iter().any(|existing| existing.version == version) {
                return Err(RecipeError::DuplicateVersion(decl.id));
            }

            let checksum = match (decl.md5, decl.sha256) {
                (Some(md5), None) => {
                    Checksum::md5(&md5).map_err(|source| RecipeError::InvalidChecksum {
                        id: decl.id.clone(),
                        source,
                    })?
                }
                (None, Some(sha256)) => {
                    Checksum::sha256(&sha256).map_err(|source| RecipeError::InvalidChecksum {
                        id: decl.id.clone(),
                        source,
                    })?
                }
                (None, None) => return Err(RecipeError::MissingChecksum(decl.id)),
                (Some(_), Some(_)) => return Err(RecipeError::AmbiguousChecksum(decl.id)),
            };

            versions.push(VersionDecl { version, checksum });
        }

        let mut dependencies = Vec::with_capacity(raw.dependencies.len());
        for decl in raw.dependencies {
            let scope = match decl.scope {
                None => ScopeSet::BOTH,
                Some(tags) => ScopeSet::from_scopes(&tags)
                    .ok_or_else(|| RecipeError::EmptyScope(decl.package.clone()))?,
            };
            let when = parse_range(&decl.package, "when", decl.when)?;
            let require = parse_range(&decl.package, "require", decl.require)?;

            dependencies.push(DependencyDecl {
                package: decl.package,
                scope,
                when,
                require,
            });
        }

        Ok(Self {
            name: raw.package.name,
            description: raw.package.description,
            homepage: raw.package.homepage,
            url: raw.package.url,
            versions,
            dependencies,
        })
    }

    fn to_raw(&self) -> RawRecipe {
        RawRecipe {
            package: RawPackage {
                name: self.name.clone(),
                description: self.description.clone(),
                homepage: self.homepage.clone(),
                url: self.url.clone(),
            },
            versions: self
                .versions
                .iter()
                .map(|decl| RawVersion {
                    id: decl.version.to_string(),
                    md5: matches!(decl.checksum, Checksum::Md5(_))
                        .then(|| decl.checksum.to_string()),
                    sha256: matches!(decl.checksum, Checksum::Sha256(_))
                        .then(|| decl.checksum.to_string()),
                })
                .collect(),
            dependencies: self
                .dependencies
                .iter()
                .map(|decl| RawDependency {
                    package: decl.package.clone(),
                    scope: Some(decl.scope.to_vec()),
                    when: decl.when.as_ref().map(ToString::to_string),
                    require: decl.require.as_ref().map(ToString::to_string),
                })
                .collect(),
        }
    }
}

/// Validate the package name.
fn validate_name(name: &str) -> Result<(), RecipeError> {
    if name.is_empty() {
        return Err(RecipeError::InvalidName(
            name.to_string(),
            "name cannot be empty",
        ));
    }

    if name.len() > 64 {
        return Err(RecipeError::InvalidName(
            name.to_string(),
            "name cannot exceed 64 characters",
        ));
    }

    // Must start with a letter
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(RecipeError::InvalidName(
            name.to_string(),
            "name must start with a letter",
        ));
    }

    // Only lowercase alphanumeric and hyphens
    for c in name.chars() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
            return Err(RecipeError::InvalidName(
                name.to_string(),
                "name can only contain lowercase letters, numbers, and hyphens",
            ));
        }
    }

    Ok(())
}

/// Validate the source URL template.
fn validate_url(url: &str) -> Result<(), RecipeError> {
    let has_scheme = url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("ftp://");
    if !has_scheme {
        return Err(RecipeError::InvalidUrl {
            url: url.to_string(),
            reason: "expected an http://, https://, or ftp:// url",
        });
    }

    if !url.contains(VERSION_PLACEHOLDER) {
        return Err(RecipeError::InvalidUrl {
            url: url.to_string(),
            reason: "missing the {version} placeholder",
        });
    }

    Ok(())
}

fn parse_range(
    package: &str,
    field: &'static str,
    range: Option<String>,
) -> Result<Option<VersionRange>, RecipeError> {
    range
        .map(|text| {
            VersionRange::parse(&text).map_err(|source| RecipeError::InvalidRange {
                package: package.to_string(),
                field,
                range: text,
                source,
            })
        })
        .transpose()
}

/// On-disk form of a recipe, prior to validation.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecipe {
    package: RawPackage,

    #[serde(default, rename = "version")]
    versions: Vec<RawVersion>,

    #[serde(default, rename = "dependency")]
    dependencies: Vec<RawDependency>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPackage {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    homepage: Option<String>,

    url: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVersion {
    id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    md5: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sha256: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDependency {
    package: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Vec<Scope>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    when: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    require: Option<String>,
}
