//! Template package commands
//!
//! Listing installed templates, installing and uninstalling template
//! packages, restoring the store and managing package feeds.

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use stencil_core::catalog::Catalog;
use stencil_core::config::{StencilPaths, StoreConfig};
use stencil_core::package::{InstallOutcome, PackageStore, UninstallOutcome};

pub const NO_TEMPLATES_HINT: &str =
    "No templates installed. Type 'stencil install --help' for help on installing templates.";

#[derive(Subcommand, Debug)]
pub enum FeedCommand {
    /// Add a directory of package archives
    Add {
        /// Feed directory
        dir: PathBuf,
    },

    /// List configured feeds
    List,

    /// Remove a feed
    Remove {
        /// Feed directory
        dir: PathBuf,
    },
}

/// Table row for installed templates
#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "Template")]
    title: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Files")]
    files: usize,
}

pub fn execute_list(paths: StencilPaths, json_output: bool) -> Result<()> {
    let store = PackageStore::open(paths)?;
    let catalog = store.load_catalog()?;

    for failure in catalog.failures() {
        eprintln!("Warning: {failure}");
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&listing_json(&catalog))?);
        return Ok(());
    }

    if catalog.packages().is_empty() {
        println!("{NO_TEMPLATES_HINT}");
        return Ok(());
    }

    for package in catalog.packages() {
        println!("{} {}", package.id, package.version);

        let table_rows: Vec<TemplateRow> = package
            .templates()
            .iter()
            .map(|template| TemplateRow {
                title: template.title().to_string(),
                path: template.path().to_string(),
                files: template.files().len(),
            })
            .collect();

        let table = Table::new(&table_rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()))
            .to_string();

        println!("{table}\n");
    }

    Ok(())
}

fn listing_json(catalog: &Catalog) -> serde_json::Value {
    let packages: Vec<serde_json::Value> = catalog
        .packages()
        .iter()
        .map(|package| {
            let templates: Vec<serde_json::Value> = package
                .templates()
                .iter()
                .map(|template| {
                    serde_json::json!({
                        "title": template.title(),
                        "path": template.path(),
                        "files": template
                            .files()
                            .iter()
                            .map(|f| f.destination_path.as_str())
                            .collect::<Vec<_>>(),
                    })
                })
                .collect();

            serde_json::json!({
                "id": package.id,
                "version": package.version,
                "templates": templates,
            })
        })
        .collect();

    serde_json::Value::Array(packages)
}

pub fn execute_install(paths: StencilPaths, id: &str, version: &str) -> Result<()> {
    let store = PackageStore::open(paths)?;

    match store.install(id, version)? {
        InstallOutcome::Installed => println!("Template package {id} installed"),
        InstallOutcome::AlreadyInstalled => {
            println!("Template package {id} is already installed")
        }
    }

    Ok(())
}

pub fn execute_uninstall(paths: StencilPaths, id: &str) -> Result<()> {
    let store = PackageStore::open(paths)?;

    match store.uninstall(id)? {
        UninstallOutcome::Uninstalled => println!("Template package {id} uninstalled"),
        UninstallOutcome::NotInstalled => println!("Template package {id} is not installed"),
    }

    Ok(())
}

pub fn execute_restore(paths: StencilPaths) -> Result<()> {
    let store = PackageStore::open(paths)?;

    if let Err(e) = store.restore() {
        tracing::error!("{e:#}");
        println!("Error restoring templates.");
        std::process::exit(1);
    }

    println!("Templates restored. Type 'stencil list' to list installed templates.");
    Ok(())
}

pub fn execute_feed_command(paths: StencilPaths, command: FeedCommand) -> Result<()> {
    let mut config = StoreConfig::load(&paths.config)?;

    match command {
        FeedCommand::Add { dir } => {
            let dir = absolute(&dir)?;
            if config.add_feed(dir.clone()) {
                config.save(&paths.config)?;
                println!("Added feed {}", dir.display());
            } else {
                println!("Feed {} is already configured", dir.display());
            }
        }
        FeedCommand::List => {
            let feeds = config.effective_feeds(&paths);
            if config.feeds.is_empty() {
                println!("No feeds configured, using the default feed:\n");
            } else {
                println!("Configured feeds:\n");
            }
            for feed in feeds {
                println!("  {}", feed.display());
            }
        }
        FeedCommand::Remove { dir } => {
            let dir = absolute(&dir)?;
            config.remove_feed(&dir)?;
            config.save(&paths.config)?;
            println!("Removed feed {}", dir.display());
        }
    }

    Ok(())
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    Ok(cwd.join(dir))
}
