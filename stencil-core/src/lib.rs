//! Stencil library exports

pub mod catalog;
pub mod config;
pub mod package;
pub mod project;

pub use catalog::{Catalog, CatalogError, Chooser, ManifestEntry, SelectionStep, TemplateRef};
pub use config::{StencilPaths, StoreConfig};
pub use package::PackageStore;
pub use project::{ProjectCreator, ProjectError};
