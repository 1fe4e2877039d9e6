//! Stencil Catalog - template discovery, merging and selection
//!
//! This module turns the installed template packages into one navigable
//! tree of categories and templates, and picks a single template from it
//! either interactively or by path.
//!
//! # Overview
//!
//! ```text
//! installed packages (PackageSource)
//!        │
//!        ▼
//! ManifestParser        ← one tree per package (templates/templates.json)
//!        │
//!        ▼
//! merge                 ← one tree for all packages, duplicates kept
//!        │
//!        ├──► select    ← drill down with a Chooser
//!        └──► resolve   ← exact path lookup (--template)
//!                │
//!                ▼
//!          TemplateRef  → ProjectCreator
//! ```
//!
//! The catalog is rebuilt for every query and holds no state between runs.

mod entry;
mod error;
mod manifest;
mod merge;
mod package;
mod resolve;
mod select;

pub use entry::{
    find_entry, join_path, parent_of, templates, Category, EntryKind, ManifestEntry, PackageId,
    Template, TemplateFile, TemplateRef, PATH_SEPARATOR,
};
pub use error::CatalogError;
pub use manifest::{ManifestParser, DECLARATIONS_KEY, MANIFEST_PATH};
pub use merge::{merge, merge_entries};
pub use package::{PackageSource, TemplatePackage};
pub use resolve::{resolve, resolve_all, resolve_unique};
pub use select::{select, Chooser, SelectionStep};

use tracing::{debug, warn};

/// The merged template tree for one query
#[derive(Debug, Default)]
pub struct Catalog {
    packages: Vec<TemplatePackage>,
    entries: Vec<ManifestEntry>,
    failures: Vec<CatalogError>,
}

impl Catalog {
    /// Parse every package and merge the results
    ///
    /// Packages without a manifest are skipped. Packages whose manifest is
    /// malformed are left out of the tree and their errors kept in
    /// [`Catalog::failures`]; the remaining packages are still merged.
    pub fn build(sources: &[PackageSource]) -> Self {
        let mut packages = Vec::new();
        let mut failures = Vec::new();

        for source in sources {
            match source.parse() {
                Ok(Some(package)) => packages.push(package),
                Ok(None) => {}
                Err(e) => {
                    warn!("Skipping template package {} {}: {}", source.id, source.version, e);
                    failures.push(e);
                }
            }
        }

        let entries = merge(&packages);
        debug!(
            packages = packages.len(),
            roots = entries.len(),
            failures = failures.len(),
            "Built template catalog"
        );

        Self {
            packages,
            entries,
            failures,
        }
    }

    /// Root entries of the merged tree
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Successfully parsed template packages, in discovery order
    pub fn packages(&self) -> &[TemplatePackage] {
        &self.packages
    }

    /// Manifest errors of packages that were left out
    pub fn failures(&self) -> &[CatalogError] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every template in the merged tree, depth-first
    pub fn templates(&self) -> Vec<TemplateRef<'_>> {
        templates(&self.entries)
    }

    pub fn select<C>(&self, chooser: &mut C) -> Result<Option<TemplateRef<'_>>, CatalogError>
    where
        C: Chooser + ?Sized,
    {
        select(&self.entries, chooser)
    }

    pub fn resolve(&self, path: &str) -> Option<TemplateRef<'_>> {
        resolve(&self.entries, path)
    }

    pub fn resolve_unique(&self, path: &str) -> Result<TemplateRef<'_>, CatalogError> {
        resolve_unique(&self.entries, path)
    }

    /// Follow an entry's parent back-reference within this catalog
    pub fn parent_of(&self, entry: &ManifestEntry) -> Option<&ManifestEntry> {
        parent_of(&self.entries, entry)
    }
}

/// Parse and merge the given packages
pub fn build_catalog(sources: &[PackageSource]) -> Catalog {
    Catalog::build(sources)
}

/// Drive `chooser` over `tree` until a template is chosen
pub fn select_interactively<'a, C>(
    tree: &'a [ManifestEntry],
    chooser: &mut C,
) -> Result<Option<TemplateRef<'a>>, CatalogError>
where
    C: Chooser + ?Sized,
{
    select(tree, chooser)
}

/// Look up a template by its exact path
pub fn resolve_by_path<'a>(tree: &'a [ManifestEntry], path: &str) -> Option<TemplateRef<'a>> {
    resolve(tree, path)
}
