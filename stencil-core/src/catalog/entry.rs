//! Catalog tree model
//!
//! A catalog is a forest of [`ManifestEntry`] nodes. Each node is either a
//! category (an ordered list of children) or a template (a list of files to
//! copy). Parents are referenced by path, never owned, so a subtree can be
//! cloned or moved without fixing up back-pointers.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use super::CatalogError;

/// Separator used when joining manifest keys into entry paths
pub const PATH_SEPARATOR: char = '/';

/// Identity of the package a template came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PackageId {
    pub id: String,
    pub version: String,
}

impl PackageId {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// A single file copied when a template is materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFile {
    /// Absolute location of the file inside the installed package
    pub source_path: PathBuf,
    /// Location relative to the new project directory
    pub destination_path: String,
}

/// A node in the catalog tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Slash-joined manifest keys from the root down to this entry
    pub path: String,
    /// Display name
    pub title: String,
    /// Path of the enclosing category, `None` for roots
    pub parent: Option<String>,
    /// Category or template payload
    #[serde(flatten)]
    pub kind: EntryKind,
}

/// Payload discriminant for [`ManifestEntry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntryKind {
    Category(Category),
    Template(Template),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Child entries in manifest declaration order (never empty)
    pub children: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub files: Vec<TemplateFile>,
    pub package: PackageId,
}

impl ManifestEntry {
    /// Create a category entry; a category needs at least one child
    pub fn category(
        path: impl Into<String>,
        title: impl Into<String>,
        parent: Option<String>,
        children: Vec<ManifestEntry>,
    ) -> Result<Self, CatalogError> {
        let path = path.into();
        if children.is_empty() {
            return Err(CatalogError::EmptyCategory { path });
        }

        Ok(Self {
            path,
            title: title.into(),
            parent,
            kind: EntryKind::Category(Category { children }),
        })
    }

    /// Create a template entry
    pub fn template(
        path: impl Into<String>,
        title: impl Into<String>,
        parent: Option<String>,
        files: Vec<TemplateFile>,
        package: PackageId,
    ) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            parent,
            kind: EntryKind::Template(Template { files, package }),
        }
    }

    pub fn is_category(&self) -> bool {
        matches!(self.kind, EntryKind::Category(_))
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, EntryKind::Template(_))
    }

    /// Children of a category, empty for templates
    pub fn children(&self) -> &[ManifestEntry] {
        match &self.kind {
            EntryKind::Category(category) => &category.children,
            EntryKind::Template(_) => &[],
        }
    }

    /// View this entry as a template, if it is one
    pub fn as_template(&self) -> Option<TemplateRef<'_>> {
        match &self.kind {
            EntryKind::Template(template) => Some(TemplateRef {
                entry: self,
                template,
            }),
            EntryKind::Category(_) => None,
        }
    }

    /// The last segment of the path (the manifest key)
    pub fn key(&self) -> &str {
        self.path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or(self.path.as_str())
    }
}

/// Borrowed view of a template entry
///
/// Returned by lookups so callers get the entry's path and title together
/// with the template payload without re-matching on [`EntryKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateRef<'a> {
    pub entry: &'a ManifestEntry,
    pub template: &'a Template,
}

impl<'a> TemplateRef<'a> {
    pub fn path(&self) -> &'a str {
        &self.entry.path
    }

    pub fn title(&self) -> &'a str {
        &self.entry.title
    }

    pub fn files(&self) -> &'a [TemplateFile] {
        &self.template.files
    }

    pub fn package(&self) -> &'a PackageId {
        &self.template.package
    }
}

impl fmt::Display for TemplateRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.title(), self.path())
    }
}

/// Join a parent path and a manifest key
pub fn join_path(parent: Option<&str>, key: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{key}"),
        None => key.to_string(),
    }
}

/// Collect every template in `entries`, depth-first in tree order
pub fn templates(entries: &[ManifestEntry]) -> Vec<TemplateRef<'_>> {
    let mut found = Vec::new();
    collect_templates(entries, &mut found);
    found
}

fn collect_templates<'a>(entries: &'a [ManifestEntry], found: &mut Vec<TemplateRef<'a>>) {
    for entry in entries {
        match &entry.kind {
            EntryKind::Category(category) => collect_templates(&category.children, found),
            EntryKind::Template(template) => found.push(TemplateRef { entry, template }),
        }
    }
}

/// Find the first entry (category or template) with the given path
pub fn find_entry<'a>(entries: &'a [ManifestEntry], path: &str) -> Option<&'a ManifestEntry> {
    for entry in entries {
        if entry.path == path {
            return Some(entry);
        }
        if let Some(found) = find_entry(entry.children(), path) {
            return Some(found);
        }
    }
    None
}

/// Resolve an entry's parent back-reference to the enclosing category
pub fn parent_of<'a>(
    entries: &'a [ManifestEntry],
    entry: &ManifestEntry,
) -> Option<&'a ManifestEntry> {
    let parent_path = entry.parent.as_deref()?;
    find_category(entries, parent_path)
}

fn find_category<'a>(entries: &'a [ManifestEntry], path: &str) -> Option<&'a ManifestEntry> {
    for entry in entries {
        if let EntryKind::Category(category) = &entry.kind {
            if entry.path == path {
                return Some(entry);
            }
            if let Some(found) = find_category(&category.children, path) {
                return Some(found);
            }
        }
    }
    None
}
