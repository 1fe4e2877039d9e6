//! Merging per-package trees into one catalog
//!
//! Packages are merged left to right. The first package seeds the tree and
//! later packages only add to it:
//!
//! - an entry whose path is not present at its level is appended
//! - a category meeting a category at the same path has its children merged
//!   recursively
//! - every other collision (template/template, category/template) keeps both
//!   entries as siblings, so the user sees the duplicate when selecting
//!
//! Inputs are never modified; the merged tree is a fresh copy.

use tracing::debug;

use super::entry::{EntryKind, ManifestEntry};
use super::package::TemplatePackage;

/// Merge the trees of `packages`, in order, into one list of root entries
pub fn merge(packages: &[TemplatePackage]) -> Vec<ManifestEntry> {
    packages
        .iter()
        .fold(Vec::new(), |merged, package| {
            debug!(
                package = %package.id,
                version = %package.version,
                entries = package.entries.len(),
                "Merging template package"
            );
            merge_entries(merged, &package.entries)
        })
}

/// Merge `incoming` into an already merged list of entries
///
/// Takes `base` by value and returns the combined list, leaving `incoming`
/// untouched.
pub fn merge_entries(mut base: Vec<ManifestEntry>, incoming: &[ManifestEntry]) -> Vec<ManifestEntry> {
    merge_level(&mut base, incoming);
    base
}

fn merge_level(merged: &mut Vec<ManifestEntry>, incoming: &[ManifestEntry]) {
    for entry in incoming {
        let EntryKind::Category(category) = &entry.kind else {
            if merged.iter().any(|existing| existing.path == entry.path) {
                debug!(path = %entry.path, "Keeping duplicate template path");
            }
            merged.push(entry.clone());
            continue;
        };

        let existing = merged
            .iter_mut()
            .filter(|existing| existing.path == entry.path)
            .find_map(|existing| match &mut existing.kind {
                EntryKind::Category(target) => Some(target),
                EntryKind::Template(_) => None,
            });

        match existing {
            Some(target) => merge_level(&mut target.children, &category.children),
            None => {
                if merged.iter().any(|existing| existing.path == entry.path) {
                    debug!(path = %entry.path, "Category collides with a template, keeping both");
                }
                merged.push(entry.clone());
            }
        }
    }
}
