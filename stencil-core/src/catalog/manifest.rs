//! Template manifest parsing (templates/templates.json)
//!
//! A template package declares its templates in a JSON document:
//!
//! ```json
//! {
//!   "projectTemplates": {
//!     "console": { "title": "Console App" },
//!     "web": {
//!       "title": "Web",
//!       "children": {
//!         "empty": { "title": "Empty Web App" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Entries with a `children` object are categories, all others are templates.
//! A template's files live under `templates/<path>/files/` in the package.

use serde_json::{Map, Value};
use std::path::Path;
use tracing::trace;

use super::entry::{join_path, ManifestEntry, PackageId, TemplateFile, PATH_SEPARATOR};
use super::CatalogError;

/// Package-relative location of the manifest
pub const MANIFEST_PATH: &str = "templates/templates.json";

/// Top-level key holding the template declarations
pub const DECLARATIONS_KEY: &str = "projectTemplates";

const TITLE_KEY: &str = "title";
const CHILDREN_KEY: &str = "children";
const TEMPLATES_DIR: &str = "templates";
const FILES_DIR: &str = "files";

/// Builds the entry tree for one package
pub struct ManifestParser<'a> {
    package: &'a PackageId,
    root: &'a Path,
    files: &'a [String],
}

impl<'a> ManifestParser<'a> {
    pub fn new(package: &'a PackageId, root: &'a Path, files: &'a [String]) -> Self {
        Self {
            package,
            root,
            files,
        }
    }

    /// Parse a manifest document into the package's root entries
    pub fn parse(&self, document: &str) -> Result<Vec<ManifestEntry>, CatalogError> {
        let manifest: Value = serde_json::from_str(document)
            .map_err(|e| self.malformed(format!("invalid JSON: {e}")))?;

        let declarations = manifest
            .get(DECLARATIONS_KEY)
            .ok_or_else(|| self.malformed(format!("missing '{DECLARATIONS_KEY}'")))?
            .as_object()
            .ok_or_else(|| self.malformed(format!("'{DECLARATIONS_KEY}' must be an object")))?;

        self.parse_level(declarations, None)
    }

    fn parse_level(
        &self,
        declarations: &Map<String, Value>,
        parent: Option<&str>,
    ) -> Result<Vec<ManifestEntry>, CatalogError> {
        declarations
            .iter()
            .map(|(key, value)| self.parse_entry(key, value, parent))
            .collect()
    }

    fn parse_entry(
        &self,
        key: &str,
        value: &Value,
        parent: Option<&str>,
    ) -> Result<ManifestEntry, CatalogError> {
        if key.is_empty() || key.contains(PATH_SEPARATOR) {
            return Err(self.malformed(format!(
                "invalid template key '{key}' (keys must be non-empty and contain no '{PATH_SEPARATOR}')"
            )));
        }

        let path = join_path(parent, key);

        let declaration = value
            .as_object()
            .ok_or_else(|| self.malformed(format!("entry '{path}' must be an object")))?;

        let title = declaration
            .get(TITLE_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| self.malformed(format!("entry '{path}' has no '{TITLE_KEY}'")))?
            .to_string();

        let parent = parent.map(str::to_string);

        match declaration.get(CHILDREN_KEY) {
            Some(children) => {
                let children = children.as_object().ok_or_else(|| {
                    self.malformed(format!("'{CHILDREN_KEY}' of '{path}' must be an object"))
                })?;

                if children.is_empty() {
                    return Err(self.malformed(format!("category '{path}' has no children")));
                }

                let children = self.parse_level(children, Some(&path))?;
                trace!(path = %path, children = children.len(), "Parsed category");
                ManifestEntry::category(path, title, parent, children)
            }
            None => {
                let files = self.template_files(&path);
                trace!(path = %path, files = files.len(), "Parsed template");
                Ok(ManifestEntry::template(
                    path,
                    title,
                    parent,
                    files,
                    self.package.clone(),
                ))
            }
        }
    }

    /// Select the package files belonging to the template at `path`
    fn template_files(&self, path: &str) -> Vec<TemplateFile> {
        let prefix = format!("{TEMPLATES_DIR}/{path}/{FILES_DIR}/");

        self.files
            .iter()
            .filter_map(|file| {
                let logical = file.replace('\\', "/");
                let destination = logical.strip_prefix(&prefix)?;
                if destination.is_empty() {
                    return None;
                }
                Some(TemplateFile {
                    source_path: self.root.join(&logical),
                    destination_path: destination.to_string(),
                })
            })
            .collect()
    }

    fn malformed(&self, reason: String) -> CatalogError {
        CatalogError::malformed(self.package.to_string(), reason)
    }
}
