//! Direct template lookup by path

use super::entry::{EntryKind, ManifestEntry, TemplateRef};
use super::CatalogError;

/// Find the first template whose path is exactly `path`
///
/// Searches depth-first in catalog order, so when several packages declare
/// the same path the earliest package wins. Categories never match.
pub fn resolve<'a>(tree: &'a [ManifestEntry], path: &str) -> Option<TemplateRef<'a>> {
    for entry in tree {
        match &entry.kind {
            EntryKind::Template(template) if entry.path == path => {
                return Some(TemplateRef { entry, template });
            }
            EntryKind::Template(_) => {}
            EntryKind::Category(category) => {
                if let Some(found) = resolve(&category.children, path) {
                    return Some(found);
                }
            }
        }
    }
    None
}

/// Every template declared at exactly `path`, in catalog order
pub fn resolve_all<'a>(tree: &'a [ManifestEntry], path: &str) -> Vec<TemplateRef<'a>> {
    super::entry::templates(tree)
        .into_iter()
        .filter(|template| template.path() == path)
        .collect()
}

/// Like [`resolve`], but fails when the path is missing or shared
pub fn resolve_unique<'a>(
    tree: &'a [ManifestEntry],
    path: &str,
) -> Result<TemplateRef<'a>, CatalogError> {
    let mut matches = resolve_all(tree, path);
    match matches.len() {
        0 => Err(CatalogError::TemplateNotFound {
            path: path.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        count => Err(CatalogError::AmbiguousPath {
            path: path.to_string(),
            count,
        }),
    }
}
