//! Stencil - create projects from installed template packages
//!
//! Without a subcommand, picks a template (by path or interactively) and
//! writes it out as a new project.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stencil_core::catalog::{CatalogError, TemplateRef};
use stencil_core::config::StencilPaths;
use stencil_core::package::PackageStore;
use stencil_core::project::{ProjectCreator, ProjectError};

mod catalog_cli;
mod prompt;

use catalog_cli::{FeedCommand, NO_TEMPLATES_HINT};
use prompt::ConsoleChooser;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "stencil",
    about = "Create new projects from installed template packages",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    #[clap(flatten)]
    create: CreateArgs,

    /// Override the stencil home directory (also STENCIL_HOME)
    #[clap(long, global = true)]
    home: Option<PathBuf>,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Template path, e.g. web/mvc/empty (prompts when omitted)
    #[clap(short, long)]
    template: Option<String>,

    /// Fail when several installed templates share the path
    #[clap(long, requires = "template")]
    strict: bool,

    /// Project name (defaults to the output directory's name)
    #[clap(short, long)]
    name: Option<String>,

    /// Output directory (defaults to ./<name>, or the current directory)
    #[clap(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List installed template packages and their templates
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Install a template package from the configured feeds
    Install {
        /// Package id
        id: String,
        /// Package version (semantic version)
        version: String,
    },

    /// Uninstall a template package
    Uninstall {
        /// Package id
        id: String,
    },

    /// Restore the declared template packages
    Restore,

    /// Manage package feeds
    Feed {
        #[clap(subcommand)]
        command: FeedCommand,
    },
}

fn initialize_tracing(log_level: &LogLevel) {
    // RUST_LOG directives are layered on top of --log-level
    let mut filter = EnvFilter::new(log_level.to_filter_directive());
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        for directive in env.split(',').filter(|d| !d.is_empty()) {
            if let Ok(parsed) = directive.parse() {
                filter = filter.add_directive(parsed);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr) // stdout is reserved for prompts and listings
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level);

    let paths = StencilPaths::discover(cli.home)?;
    debug!("Stencil home: {}", paths.root.display());

    match cli.command {
        None => create_command(paths, cli.create),
        Some(Command::List { json }) => catalog_cli::execute_list(paths, json),
        Some(Command::Install { id, version }) => {
            catalog_cli::execute_install(paths, &id, &version)
        }
        Some(Command::Uninstall { id }) => catalog_cli::execute_uninstall(paths, &id),
        Some(Command::Restore) => catalog_cli::execute_restore(paths),
        Some(Command::Feed { command }) => catalog_cli::execute_feed_command(paths, command),
    }
}

fn create_command(paths: StencilPaths, args: CreateArgs) -> Result<()> {
    let store = PackageStore::open(paths)?;
    let catalog = store.load_catalog()?;

    if catalog.is_empty() {
        println!("{NO_TEMPLATES_HINT}");
        std::process::exit(1);
    }

    let template = match &args.template {
        Some(path) => match find_template(&catalog, path, args.strict) {
            Ok(template) => template,
            Err(CatalogError::TemplateNotFound { .. }) => {
                println!(
                    "The template {path} wasn't found. Type 'stencil list' to list installed \
                     templates, or 'stencil' to select from installed templates."
                );
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        None => {
            let mut chooser = ConsoleChooser::stdio();
            let Some(template) = catalog.select(&mut chooser)? else {
                println!("{NO_TEMPLATES_HINT}");
                std::process::exit(1);
            };
            println!("Selected template {template}");
            template
        }
    };

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let (name, target) = project_location(args.name, args.output, &cwd)?;

    match ProjectCreator::new().create(&name, &target, &template) {
        Ok(written) => {
            debug!("Wrote {} file(s)", written.len());
            println!();
            println!("Created \"{}\" in {}", name, target.display());
            Ok(())
        }
        Err(e @ ProjectError::TargetNotEmpty(_)) => {
            println!("{e}");
            std::process::exit(1);
        }
        Err(e) => Err(e).context("Error creating project"),
    }
}

fn find_template<'a>(
    catalog: &'a stencil_core::Catalog,
    path: &str,
    strict: bool,
) -> Result<TemplateRef<'a>, CatalogError> {
    if strict {
        return catalog.resolve_unique(path);
    }

    catalog
        .resolve(path)
        .ok_or_else(|| CatalogError::TemplateNotFound {
            path: path.to_string(),
        })
}

/// Project name and target directory from the command line
fn project_location(
    name: Option<String>,
    output: Option<PathBuf>,
    cwd: &Path,
) -> Result<(String, PathBuf)> {
    match (name, output) {
        (Some(name), Some(output)) => Ok((name, cwd.join(output))),
        (Some(name), None) => {
            let target = cwd.join(&name);
            Ok((name, target))
        }
        (None, output) => {
            let target = output.map_or_else(|| cwd.to_path_buf(), |o| cwd.join(o));
            let name = target
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .with_context(|| {
                    format!(
                        "Cannot derive a project name from {}. Pass --name",
                        target.display()
                    )
                })?;
            Ok((name, target))
        }
    }
}
