//! The local template package store
//!
//! Install and uninstall edit the dependency file and restore immediately.
//! A failed restore puts the dependency file back the way it was.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{DependencyFile, FeedRestorer, RestoreLock, Restorer};
use crate::catalog::{Catalog, PackageSource, MANIFEST_PATH};
use crate::config::{StencilPaths, StoreConfig};

/// Result of [`PackageStore::install`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

/// Result of [`PackageStore::uninstall`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Uninstalled,
    NotInstalled,
}

pub struct PackageStore<R = FeedRestorer> {
    paths: StencilPaths,
    restorer: R,
}

impl PackageStore<FeedRestorer> {
    /// Open the store with the feeds from its configuration
    pub fn open(paths: StencilPaths) -> Result<Self> {
        let config = StoreConfig::load(&paths.config)?;
        let restorer = FeedRestorer::new(config.effective_feeds(&paths));
        debug!("Package feeds: {:?}", restorer.feeds());

        Ok(Self::with_restorer(paths, restorer))
    }
}

impl<R: Restorer> PackageStore<R> {
    pub fn with_restorer(paths: StencilPaths, restorer: R) -> Self {
        Self { paths, restorer }
    }

    pub fn paths(&self) -> &StencilPaths {
        &self.paths
    }

    pub fn dependencies(&self) -> Result<DependencyFile> {
        DependencyFile::load(&self.paths.dependencies)
    }

    /// Declare a package and restore
    pub fn install(&self, id: &str, version: &str) -> Result<InstallOutcome> {
        validate_package_id(id)?;
        validate_version(version)?;

        let mut dependencies = self.dependencies()?;
        if dependencies.contains(id) {
            info!("Template package {} is already installed", id);
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        dependencies.add(id, version);
        self.apply(&dependencies)
            .with_context(|| format!("Error installing template package {id}"))?;

        info!("Template package {} {} installed", id, version);
        Ok(InstallOutcome::Installed)
    }

    /// Remove a declared package and restore
    pub fn uninstall(&self, id: &str) -> Result<UninstallOutcome> {
        let mut dependencies = self.dependencies()?;
        if !dependencies.remove(id) {
            info!("Template package {} is not installed", id);
            return Ok(UninstallOutcome::NotInstalled);
        }

        self.apply(&dependencies)
            .with_context(|| format!("Error uninstalling template package {id}"))?;

        info!("Template package {} uninstalled", id);
        Ok(UninstallOutcome::Uninstalled)
    }

    /// Restore the declared packages and write the lock
    pub fn restore(&self) -> Result<RestoreLock> {
        let dependencies = self.dependencies()?;
        self.restore_with(&dependencies)
    }

    /// Every restored package, in lock order
    ///
    /// Restores first when the store has never been restored or the lock
    /// no longer matches the dependency file.
    pub fn list_installed_packages(&self) -> Result<Vec<PackageSource>> {
        let dependencies = self.dependencies()?;
        let lock = match RestoreLock::load(&self.paths.lock)? {
            Some(lock) if lock.matches(&dependencies) => lock,
            Some(_) => {
                debug!("Restore lock is out of date, restoring");
                self.restore_with(&dependencies)?
            }
            None => {
                debug!("No restore lock found, restoring");
                self.restore_with(&dependencies)?
            }
        };

        lock.packages
            .iter()
            .map(|package| {
                let files = list_package_files(&package.path)?;
                let manifest_path = package.path.join(MANIFEST_PATH);
                let manifest = if manifest_path.is_file() {
                    Some(std::fs::read_to_string(&manifest_path).with_context(|| {
                        format!("Failed to read {}", manifest_path.display())
                    })?)
                } else {
                    None
                };

                Ok(PackageSource {
                    id: package.id.clone(),
                    version: package.version.clone(),
                    manifest,
                    files,
                    root: package.path.clone(),
                })
            })
            .collect()
    }

    /// Build the template catalog from the installed packages
    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::build(&self.list_installed_packages()?))
    }

    fn restore_with(&self, dependencies: &DependencyFile) -> Result<RestoreLock> {
        let lock = self.restorer.restore(dependencies, &self.paths)?;
        lock.save(&self.paths.lock)?;
        debug!("Wrote {}", self.paths.lock.display());
        Ok(lock)
    }

    /// Save `dependencies` and restore, rolling the file back on failure
    fn apply(&self, dependencies: &DependencyFile) -> Result<RestoreLock> {
        let path = &self.paths.dependencies;
        let original = if path.exists() {
            Some(std::fs::read(path)?)
        } else {
            None
        };

        dependencies.save(path)?;

        match self.restore_with(dependencies) {
            Ok(lock) => Ok(lock),
            Err(e) => {
                warn!("Restore failed, rolling back {}: {:#}", path.display(), e);
                match original {
                    Some(bytes) => std::fs::write(path, bytes)?,
                    None => std::fs::remove_file(path)?,
                }
                Err(e)
            }
        }
    }
}

/// Package-relative file paths, `/`-separated and sorted
fn list_package_files(root: &Path) -> Result<Vec<String>> {
    if !root.is_dir() {
        anyhow::bail!(
            "Package directory {} is missing. Run 'stencil restore'",
            root.display()
        );
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root)?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        files.push(parts.join("/"));
    }

    files.sort();
    Ok(files)
}

fn validate_package_id(id: &str) -> Result<()> {
    if id.is_empty() || id == "." || id == ".." {
        anyhow::bail!("Invalid package id '{}'", id);
    }

    if id
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace())
    {
        anyhow::bail!(
            "Invalid package id '{}': must not contain path separators or whitespace",
            id
        );
    }

    Ok(())
}

fn validate_version(version: &str) -> Result<()> {
    semver::Version::parse(version)
        .map(|_| ())
        .with_context(|| format!("Invalid package version '{version}': expected a semantic version"))
}
