//! Implementation of the `retort show` and `retort versions` commands.

use anyhow::{anyhow, Result};
use retort_recipe::{Catalog, DependencyDecl, Recipe, VersionDecl};

/// Print a package recipe in full.
pub fn show(catalog: &Catalog, package: &str, json: bool) -> Result<()> {
    let recipe = lookup(catalog, package)?;

    if json {
        println!("{}", serde_json::to_string_pretty(recipe)?);
        return Ok(());
    }

    println!("{}", recipe.name());
    if let Some(description) = recipe.description() {
        println!("  {description}");
    }
    if let Some(homepage) = recipe.homepage() {
        println!("  homepage: {homepage}");
    }
    println!("  url: {}", recipe.url_template());

    if !recipe.versions().is_empty() {
        println!();
        println!("versions:");
        for decl in recipe.versions() {
            println!("  {}", describe_version(decl));
        }
    }

    if !recipe.dependencies().is_empty() {
        println!();
        println!("dependencies:");
        for dep in recipe.dependencies() {
            println!("  {}", describe_dependency(dep));
        }
    }

    Ok(())
}

/// Print the declared versions and checksums of a package.
pub fn versions(catalog: &Catalog, package: &str) -> Result<()> {
    let recipe = lookup(catalog, package)?;
    for decl in recipe.versions() {
        println!("{}", describe_version(decl));
    }
    Ok(())
}

/// Look up a recipe by name.
pub fn lookup<'a>(catalog: &'a Catalog, package: &str) -> Result<&'a Recipe> {
    catalog
        .get(package)
        .ok_or_else(|| anyhow!("package '{package}' not found in catalog"))
}

fn describe_version(decl: &VersionDecl) -> String {
    format!(
        "{}  {} {}",
        decl.version(),
        decl.checksum().algorithm(),
        decl.checksum()
    )
}

/// One-line rendering of a dependency edge.
pub fn describe_dependency(dep: &DependencyDecl) -> String {
    let mut line = format!("{} ({})", dep.package(), dep.scope());
    if let Some(when) = dep.when() {
        line.push_str(&format!(" when {when}"));
    }
    if let Some(require) = dep.require() {
        line.push_str(&format!(" requires {require}"));
    }
    line
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
require = "3.4.0:3.4.9"
when = "1.24.0:1.24.9"

[[dependency]]
package = "r-affy"
scope = ["run"]
"#;

    #[test]
    fn describes_versions_and_dependencies() {
        let recipe = Recipe::parse(AFFYDATA).unwrap();

        assert_eq!(
            describe_version(&recipe.versions()[0]),
            "1.24.0  md5 0b6938685c450a56d65dd5628ebed42d"
        );
        assert_eq!(
            describe_dependency(&recipe.dependencies()[0]),
            "r (build+run) when 1.24.0:1.24.9 requires 3.4.0:3.4.9"
        );
        assert_eq!(
            describe_dependency(&recipe.dependencies()[1]),
            "r-affy (run)"
        );
    }

    #[test]
    fn lookup_unknown_package_fails() {
        let catalog = Catalog::from_recipes([Recipe::parse(AFFYDATA).unwrap()]).unwrap();
        assert!(lookup(&catalog, "r-affydata").is_ok());
        assert!(lookup(&catalog, "r-affy").is_err());
    }
}
