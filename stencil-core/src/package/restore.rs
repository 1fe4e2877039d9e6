//! Package restore from local feeds
//!
//! A feed is a directory of `<id>.<version>.tar.gz` archives. Restoring
//! extracts every declared package into `packages/<id>/<version>/` and
//! removes the directories of packages that are no longer declared.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Dependency, DependencyFile, RestoreLock};
use crate::config::StencilPaths;

/// Materializes the declared packages on disk
pub trait Restorer {
    /// Restore `dependencies` into the store and describe the result
    ///
    /// The store persists the returned lock. An error means the store may
    /// not match the dependency file.
    fn restore(&self, dependencies: &DependencyFile, paths: &StencilPaths) -> Result<RestoreLock>;
}

/// Restores packages from archives in local feed directories
#[derive(Debug, Clone)]
pub struct FeedRestorer {
    feeds: Vec<PathBuf>,
}

impl FeedRestorer {
    pub fn new(feeds: Vec<PathBuf>) -> Self {
        Self { feeds }
    }

    pub fn feeds(&self) -> &[PathBuf] {
        &self.feeds
    }

    /// File name of a package archive inside a feed
    pub fn archive_name(id: &str, version: &str) -> String {
        format!("{id}.{version}.tar.gz")
    }

    /// Find a package archive; the first feed containing it wins
    pub fn locate(&self, id: &str, version: &str) -> Option<PathBuf> {
        let name = Self::archive_name(id, version);
        self.feeds
            .iter()
            .map(|feed| feed.join(&name))
            .find(|candidate| candidate.is_file())
    }

    fn locate_all<'a>(&self, dependencies: &'a DependencyFile) -> Result<Vec<(&'a Dependency, PathBuf)>> {
        dependencies
            .dependencies
            .iter()
            .map(|dep| {
                let archive = self.locate(&dep.id, &dep.version).with_context(|| {
                    format!(
                        "Package {} {} was not found in any feed ({})",
                        dep.id,
                        dep.version,
                        self.feeds
                            .iter()
                            .map(|f| f.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })?;
                Ok((dep, archive))
            })
            .collect()
    }
}

impl Restorer for FeedRestorer {
    fn restore(&self, dependencies: &DependencyFile, paths: &StencilPaths) -> Result<RestoreLock> {
        // Nothing is touched until every archive is known to exist
        let located = self.locate_all(dependencies)?;
        let previous = RestoreLock::load(&paths.lock).ok().flatten();

        std::fs::create_dir_all(&paths.packages).with_context(|| {
            format!("Failed to create package directory: {}", paths.packages.display())
        })?;

        let mut lock = RestoreLock::default();
        for (dep, archive) in located {
            let bytes = std::fs::read(&archive)
                .with_context(|| format!("Failed to read archive: {}", archive.display()))?;
            let digest = sha256_digest(&bytes);
            let dest = paths.package_dir(&dep.id, &dep.version);

            let unchanged = previous
                .as_ref()
                .and_then(|lock| lock.get(&dep.id))
                .is_some_and(|p| p.version == dep.version && p.digest == digest);

            if unchanged && dest.is_dir() {
                debug!("{} {} is up to date", dep.id, dep.version);
            } else {
                extract_package(&bytes, &paths.packages, &dest).with_context(|| {
                    format!("Failed to restore {} {} from {}", dep.id, dep.version, archive.display())
                })?;
                info!("Restored {} {} from {}", dep.id, dep.version, archive.display());
            }

            lock.add_restored(&dep.id, &dep.version, dest, digest);
        }

        prune_undeclared(&paths.packages, dependencies)?;

        Ok(lock)
    }
}

/// SHA-256 digest of archive content, `sha256:<hex>`
pub fn sha256_digest(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}

/// Extract an archive into `dest`, replacing any previous content
///
/// The archive is unpacked into a staging directory next to `dest` first, so
/// a corrupt archive leaves the previous extraction in place.
fn extract_package(bytes: &[u8], packages_dir: &Path, dest: &Path) -> Result<()> {
    let staging = tempfile::Builder::new()
        .prefix(".restore-")
        .tempdir_in(packages_dir)?;

    let gz_decoder = flate2::read::GzDecoder::new(Cursor::new(bytes));
    let mut archive = tar::Archive::new(gz_decoder);
    archive
        .unpack(staging.path())
        .context("Failed to extract archive")?;

    if dest.exists() {
        std::fs::remove_dir_all(dest)?;
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::rename(staging.path(), dest)
        .with_context(|| format!("Failed to move package into {}", dest.display()))?;

    Ok(())
}

/// Remove package directories that the dependency file no longer declares
fn prune_undeclared(packages_dir: &Path, dependencies: &DependencyFile) -> Result<()> {
    for id_entry in std::fs::read_dir(packages_dir)? {
        let id_entry = id_entry?;
        if !id_entry.file_type()?.is_dir() {
            continue;
        }

        let id = id_entry.file_name().to_string_lossy().into_owned();
        match dependencies.get(&id) {
            None => {
                debug!("Removing undeclared package {}", id);
                std::fs::remove_dir_all(id_entry.path())?;
            }
            Some(dep) => {
                for version_entry in std::fs::read_dir(id_entry.path())? {
                    let version_entry = version_entry?;
                    if version_entry.file_name().to_string_lossy() != dep.version.as_str() {
                        debug!(
                            "Removing stale version {} of {}",
                            version_entry.file_name().to_string_lossy(),
                            id
                        );
                        let path = version_entry.path();
                        if version_entry.file_type()?.is_dir() {
                            std::fs::remove_dir_all(path)?;
                        } else {
                            std::fs::remove_file(path)?;
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
