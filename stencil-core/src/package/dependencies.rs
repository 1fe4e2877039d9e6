//! Declared template packages (templates.yaml)
//!
//! The dependency file lists the template packages the user installed, in
//! installation order. Restore turns it into extracted packages and a lock.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A declared template package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub id: String,
    pub version: String,
}

/// Contents of templates.yaml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl DependencyFile {
    /// Load the dependency file, or an empty one if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Invalid dependency file YAML")
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).context("Failed to serialize dependency file")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Look up a declared package by id
    pub fn get(&self, id: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Declare a package; returns false if the id is already declared
    pub fn add(&mut self, id: &str, version: &str) -> bool {
        if self.contains(id) {
            return false;
        }

        self.dependencies.push(Dependency {
            id: id.to_string(),
            version: version.to_string(),
        });
        true
    }

    /// Remove a declared package; returns false if it was not declared
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.dependencies.len();
        self.dependencies.retain(|d| d.id != id);
        self.dependencies.len() != before
    }
}
