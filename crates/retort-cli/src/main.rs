//! Retort CLI - command-line interface for Retort recipe catalogs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use retort_recipe::{Catalog, Scope};
use std::path::{Path, PathBuf};

mod deps;
mod lint;
mod list;
mod show;

#[derive(Parser)]
#[command(name = "retort")]
#[command(version)]
#[command(about = "Inspect and lint Retort recipe catalogs", long_about = None)]
struct Cli {
    /// Path to the recipe repository
    #[arg(short = 'R', long, global = true, default_value = "recipes")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every package in the catalog
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a package recipe
    Show {
        /// Package name
        package: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the declared versions and checksums of a package
    Versions {
        /// Package name
        package: String,
    },

    /// Show the dependency edges that apply at a package version
    Deps {
        /// Package and version, e.g. "r-affydata@1.24.0"
        reference: String,

        /// Only edges needed to build the package
        #[arg(long, conflicts_with = "run")]
        build: bool,

        /// Only edges needed at run time
        #[arg(long)]
        run: bool,
    },

    /// Print the source url and expected checksum for a package version
    Url {
        /// Package and version, e.g. "r-affydata@1.24.0"
        reference: String,
    },

    /// Validate every recipe in the repository
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::List { json } => list::list(&load_catalog(&cli.repo)?, json),

        Commands::Show { package, json } => show::show(&load_catalog(&cli.repo)?, &package, json),

        Commands::Versions { package } => show::versions(&load_catalog(&cli.repo)?, &package),

        Commands::Deps {
            reference,
            build,
            run,
        } => {
            let scope = if build {
                Some(Scope::Build)
            } else if run {
                Some(Scope::Run)
            } else {
                None
            };
            deps::deps(&load_catalog(&cli.repo)?, &reference, scope)
        }

        Commands::Url { reference } => deps::url(&load_catalog(&cli.repo)?, &reference),

        Commands::Lint => lint::lint(&cli.repo),
    }
}

fn load_catalog(repo: &Path) -> Result<Catalog> {
    Catalog::load(repo)
        .with_context(|| format!("failed to load recipe catalog from {}", repo.display()))
}
