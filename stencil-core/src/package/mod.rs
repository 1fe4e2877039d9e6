//! Template package store
//!
//! Declared packages live in `templates.yaml`, restored ones in
//! `packages/<id>/<version>/` with `templates.lock` recording what was
//! extracted. The catalog reads the store through
//! [`PackageStore::list_installed_packages`].

mod dependencies;
mod lock;
mod restore;
mod store;

pub use dependencies::{Dependency, DependencyFile};
pub use lock::{RestoreLock, RestoredPackage};
pub use restore::{sha256_digest, FeedRestorer, Restorer};
pub use store::{InstallOutcome, PackageStore, UninstallOutcome};
