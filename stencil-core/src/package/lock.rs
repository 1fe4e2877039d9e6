//! Restore lock file management (templates.lock)
//!
//! Records which package versions were extracted by the last successful
//! restore, where they live and the digest of the archive they came from.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::DependencyFile;

const API_VERSION: &str = "stencil.dev/v1";

/// The lock file written by a successful restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreLock {
    /// API version for schema compatibility
    pub api_version: String,
    /// When this lock file was last written
    pub generated: String,
    /// Restored packages, in dependency order
    pub packages: Vec<RestoredPackage>,
}

/// A restored package entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoredPackage {
    pub id: String,
    pub version: String,
    /// Extraction directory
    pub path: PathBuf,
    /// Archive digest, `sha256:<hex>`
    pub digest: String,
    pub restored_at: String,
}

impl Default for RestoreLock {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            generated: chrono::Utc::now().to_rfc3339(),
            packages: Vec::new(),
        }
    }
}

impl RestoreLock {
    /// Load the lock file; `None` when no restore has happened yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).context("Failed to read templates.lock")?;

        serde_yaml_ng::from_str(&content)
            .map(Some)
            .context("Failed to parse templates.lock")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut lock = self.clone();
        lock.generated = chrono::Utc::now().to_rfc3339();

        let content = serde_yaml_ng::to_string(&lock)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Record a restored package, replacing any entry with the same id
    pub fn add_restored(&mut self, id: &str, version: &str, path: PathBuf, digest: String) {
        self.packages.retain(|p| p.id != id);

        self.packages.push(RestoredPackage {
            id: id.to_string(),
            version: version.to_string(),
            path,
            digest,
            restored_at: chrono::Utc::now().to_rfc3339(),
        });
    }

    pub fn get(&self, id: &str) -> Option<&RestoredPackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Whether the lock covers exactly the declared dependencies, in order
    ///
    /// Package order is merge order, so a reordered dependency file counts
    /// as out of date.
    pub fn matches(&self, dependencies: &DependencyFile) -> bool {
        self.packages.len() == dependencies.dependencies.len()
            && self
                .packages
                .iter()
                .zip(&dependencies.dependencies)
                .all(|(p, d)| p.id == d.id && p.version == d.version)
    }
}
