//! Implementation of the `retort lint` command.

use anyhow::{bail, Context, Result};
use retort_recipe::{recipe_paths, Recipe};
use std::path::{Path, PathBuf};

/// Validate every recipe in the repository, reporting all failures
/// rather than stopping at the first.
pub fn lint(repo: &Path) -> Result<()> {
    let (checked, failures) = check_repository(repo)?;

    for (path, message) in &failures {
        eprintln!("{}: {message}", path.display());
    }
    println!("checked {checked} recipes");

    if !failures.is_empty() {
        bail!("{} invalid recipe(s)", failures.len());
    }
    Ok(())
}

/// Check every recipe under a repository root. Returns the number of
/// recipes checked and one entry per failure.
fn check_repository(repo: &Path) -> Result<(usize, Vec<(PathBuf, String)>)> {
    let paths = recipe_paths(repo)
        .with_context(|| format!("failed to scan recipe repository {}", repo.display()))?;

    let mut failures = Vec::new();
    for path in &paths {
        match Recipe::from_path(path) {
            Ok(recipe) => {
                let dir = directory_name(path);
                if recipe.name() != dir {
                    failures.push((
                        path.clone(),
                        format!(
                            "declares package '{}' but lives in directory '{dir}'",
                            recipe.name()
                        ),
                    ));
                }
            }
            Err(e) => failures.push((path.clone(), e.to_string())),
        }
    }

    Ok((paths.len(), failures))
}

fn directory_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use retort_recipe::RECIPE_FILE;
    use std::fs;
    use tempfile::TempDir;

    fn write_recipe(root: &Path, dir: &str, content: &str) {
        let package_dir = root.join(dir);
        fs::create_dir_all(&package_dir).unwrap();
        fs::write(package_dir.join(RECIPE_FILE), content).unwrap();
    }

    const GOOD: &str = r#"
[package]
name = "r-affy"
url = "https://example.org/affy_{version}.tar.gz"
"#;

    #[test]
    fn clean_repository_passes() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "r-affy", GOOD);

        let (checked, failures) = check_repository(tmp.path()).unwrap();
        assert_eq!(checked, 1);
        assert!(failures.is_empty());
        assert!(lint(tmp.path()).is_ok());
    }

    #[test]
    fn collects_every_failure() {
        let tmp = TempDir::new().unwrap();
        write_recipe(tmp.path(), "r-affy", GOOD);
        write_recipe(tmp.path(), "broken", "not toml = [");
        write_recipe(tmp.path(), "misnamed", GOOD);

        let (checked, failures) = check_repository(tmp.path()).unwrap();
        assert_eq!(checked, 3);
        assert_eq!(failures.len(), 2);
        assert!(lint(tmp.path()).is_err());
    }

    #[test]
    fn missing_repository_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(lint(&tmp.path().join("nope")).is_err());
    }
}
