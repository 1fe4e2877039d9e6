//! Per-package catalog input and output
//!
//! [`PackageSource`] is what package discovery hands to the catalog: the raw
//! manifest text and file listing of one installed package. [`TemplatePackage`]
//! is the parsed tree for that package.

use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use super::entry::{templates, ManifestEntry, PackageId, TemplateRef};
use super::manifest::ManifestParser;
use super::CatalogError;

/// One installed package as reported by discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    pub id: String,
    pub version: String,
    /// Contents of `templates/templates.json`, `None` if the package has none
    pub manifest: Option<String>,
    /// Package-relative logical file locations, `/`-separated
    pub files: Vec<String>,
    /// Directory the package was extracted to
    pub root: PathBuf,
}

impl PackageSource {
    pub fn package_id(&self) -> PackageId {
        PackageId::new(&self.id, &self.version)
    }

    /// Parse this package's manifest into a template tree
    ///
    /// Returns `Ok(None)` for packages without a manifest; those are ordinary
    /// dependencies, not template packages.
    pub fn parse(&self) -> Result<Option<TemplatePackage>, CatalogError> {
        let Some(document) = &self.manifest else {
            debug!("Package {} {} has no template manifest", self.id, self.version);
            return Ok(None);
        };

        let package = self.package_id();
        let entries = ManifestParser::new(&package, &self.root, &self.files).parse(document)?;

        Ok(Some(TemplatePackage {
            id: self.id.clone(),
            version: self.version.clone(),
            root: self.root.clone(),
            entries,
        }))
    }
}

/// A template package and its root-level catalog entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplatePackage {
    pub id: String,
    pub version: String,
    pub root: PathBuf,
    pub entries: Vec<ManifestEntry>,
}

impl TemplatePackage {
    pub fn package_id(&self) -> PackageId {
        PackageId::new(&self.id, &self.version)
    }

    /// Every template in this package, depth-first
    pub fn templates(&self) -> Vec<TemplateRef<'_>> {
        templates(&self.entries)
    }
}
