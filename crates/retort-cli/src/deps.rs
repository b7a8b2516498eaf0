//! Implementation of the `retort deps` and `retort url` commands.

use anyhow::{anyhow, Result};
use retort_recipe::{Catalog, PackageRef, Recipe, Scope, Version};

use crate::show::describe_dependency;

/// Print the dependency edges that apply at a package version,
/// optionally filtered to one environment.
pub fn deps(catalog: &Catalog, reference: &str, scope: Option<Scope>) -> Result<()> {
    let (recipe, version) = lookup_versioned(catalog, reference)?;

    let edges: Vec<_> = match scope {
        Some(scope) => recipe.dependencies_in_scope(&version, scope).collect(),
        None => recipe.dependencies_for(&version).collect(),
    };

    for dep in edges {
        println!("{}", describe_dependency(dep));
    }
    Ok(())
}

/// Print the concrete source url and expected checksum for a declared
/// package version, as the builder would use them.
pub fn url(catalog: &Catalog, reference: &str) -> Result<()> {
    let (recipe, version) = lookup_versioned(catalog, reference)?;

    let checksum = recipe.checksum_for(&version).ok_or_else(|| {
        anyhow!(
            "package '{}' has no declared version '{}'",
            recipe.name(),
            version
        )
    })?;

    println!("{}", recipe.url_for(&version));
    println!("{} {}", checksum.algorithm(), checksum);
    Ok(())
}

/// Resolve a `name@version` argument against the catalog.
fn lookup_versioned<'a>(catalog: &'a Catalog, reference: &str) -> Result<(&'a Recipe, Version)> {
    let parsed = PackageRef::parse(reference)?;
    let version = parsed
        .version()
        .cloned()
        .ok_or_else(|| anyhow!("expected '<package>@<version>', got '{reference}'"))?;
    let recipe = catalog
        .get(parsed.name())
        .ok_or_else(|| anyhow!("package '{}' not found in catalog", parsed.name()))?;
    Ok((recipe, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use retort_recipe::Recipe;

    const AFFYDATA: &str = r#"
[package]
name = "r-affydata"
url = "https://example.org/affydata_{version}.tar.gz"

[[version]]
id = "1.24.0"
md5 = "0b6938685c450a56d65dd5628ebed42d"

[[dependency]]
package = "r"
when = "1.24.0:1.24.9"
"#;

    fn catalog() -> Catalog {
        Catalog::from_recipes([Recipe::parse(AFFYDATA).unwrap()]).unwrap()
    }

    #[test]
    fn lookup_requires_a_version() {
        let catalog = catalog();
        assert!(lookup_versioned(&catalog, "r-affydata@1.24.0").is_ok());
        assert!(lookup_versioned(&catalog, "r-affydata").is_err());
        assert!(lookup_versioned(&catalog, "r-affy@1.0").is_err());
    }

    #[test]
    fn deps_accepts_undeclared_versions() {
        // Edges are a property of the range, not of the declared
        // version list; querying outside it just yields no edges.
        let catalog = catalog();
        assert!(deps(&catalog, "r-affydata@2.0.0", None).is_ok());
    }

    #[test]
    fn url_rejects_undeclared_versions() {
        let catalog = catalog();
        assert!(url(&catalog, "r-affydata@1.24.0").is_ok());
        assert!(url(&catalog, "r-affydata@2.0.0").is_err());
    }
}
