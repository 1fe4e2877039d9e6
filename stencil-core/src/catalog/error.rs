//! Catalog error types

use thiserror::Error;

/// Errors raised while building or querying the template catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A package ships a manifest that does not describe a template tree
    #[error("Template manifest of package '{package}' is malformed: {reason}")]
    ManifestMalformed { package: String, reason: String },

    /// More than one template is declared at the same path
    #[error("Template path '{path}' is ambiguous: {count} installed templates share it")]
    AmbiguousPath { path: String, count: usize },

    /// The chooser returned an index outside the candidate list
    #[error("Selection {index} is out of range (expected 1 to {len})")]
    SelectionIndexOutOfRange { index: usize, len: usize },

    /// A category was built without children
    #[error("Category '{path}' has no children")]
    EmptyCategory { path: String },

    /// No template is declared at the requested path
    #[error("The template {path} wasn't found")]
    TemplateNotFound { path: String },

    /// The chooser could not read the user's input
    #[error("Failed to read template selection")]
    Input(#[from] std::io::Error),
}

impl CatalogError {
    pub(crate) fn malformed(package: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::ManifestMalformed {
            package: package.into(),
            reason: reason.into(),
        }
    }
}
