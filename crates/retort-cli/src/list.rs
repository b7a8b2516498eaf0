//! Implementation of the `retort list` command.

use anyhow::Result;
use retort_recipe::Catalog;

/// Print every package name in the catalog.
pub fn list(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        let names: Vec<&str> = catalog.names().collect();
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in catalog.names() {
            println!("{name}");
        }
    }
    Ok(())
}
