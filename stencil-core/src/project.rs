//! Project materialization
//!
//! Copies a template's files into a new project directory and substitutes
//! the project name for the namespace placeholder.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::TemplateRef;

/// Token replaced with the project name in text files
pub const NAMESPACE_PLACEHOLDER: &str = "$DefaultNamespace$";

#[derive(Error, Debug)]
pub enum ProjectError {
    /// The target directory already has content
    #[error("Target directory '{}' is not empty", .0.display())]
    TargetNotEmpty(PathBuf),

    /// A template file would be written outside the target directory
    #[error("Template file destination '{0}' escapes the project directory")]
    UnsafeDestination(String),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes a template out as a new project
#[derive(Debug, Clone, Default)]
pub struct ProjectCreator;

impl ProjectCreator {
    pub fn new() -> Self {
        Self
    }

    /// Create project `name` in `target` from `template`
    ///
    /// Returns the written files in template order.
    pub fn create(
        &self,
        name: &str,
        target: &Path,
        template: &TemplateRef<'_>,
    ) -> Result<Vec<PathBuf>, ProjectError> {
        if !is_empty_or_missing(target).map_err(io_error(target))? {
            return Err(ProjectError::TargetNotEmpty(target.to_path_buf()));
        }

        // Checked up front so a bad template leaves nothing behind
        for file in template.files() {
            if !is_contained(&file.destination_path) {
                return Err(ProjectError::UnsafeDestination(
                    file.destination_path.clone(),
                ));
            }
        }

        std::fs::create_dir_all(target).map_err(io_error(target))?;

        let mut written = Vec::with_capacity(template.files().len());
        for file in template.files() {
            let dest = target.join(&file.destination_path);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(io_error(parent))?;
            }

            let bytes = std::fs::read(&file.source_path).map_err(io_error(&file.source_path))?;
            match String::from_utf8(bytes) {
                Ok(text) => {
                    std::fs::write(&dest, text.replace(NAMESPACE_PLACEHOLDER, name))
                        .map_err(io_error(&dest))?;
                }
                Err(e) => {
                    debug!("{} is not UTF-8, copying verbatim", file.source_path.display());
                    std::fs::write(&dest, e.into_bytes()).map_err(io_error(&dest))?;
                }
            }

            debug!("Wrote {}", dest.display());
            written.push(dest);
        }

        info!(
            "Created \"{}\" in {} from {}",
            name,
            target.display(),
            template
        );
        Ok(written)
    }
}

fn is_empty_or_missing(path: &Path) -> std::io::Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(std::fs::read_dir(path)?.next().is_none())
}

/// Relative path that stays below its base
fn is_contained(destination: &str) -> bool {
    !destination.is_empty()
        && Path::new(destination)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ProjectError + '_ {
    move |source| ProjectError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ManifestEntry, PackageId, TemplateFile};
    use tempfile::TempDir;

    fn template_with(files: Vec<TemplateFile>) -> ManifestEntry {
        ManifestEntry::template("console", "Console App", None, files, PackageId::new("A", "1.0"))
    }

    fn source_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_create_substitutes_namespace() {
        let temp_dir = TempDir::new().unwrap();
        let program = source_file(
            temp_dir.path(),
            "Program.cs",
            b"namespace $DefaultNamespace$ { class $DefaultNamespace$App {} }",
        );
        let entry = template_with(vec![TemplateFile {
            source_path: program,
            destination_path: "src/Program.cs".into(),
        }]);

        let target = temp_dir.path().join("MyApp");
        let written = ProjectCreator::new()
            .create("MyApp", &target, &entry.as_template().unwrap())
            .unwrap();

        assert_eq!(written, vec![target.join("src/Program.cs")]);
        assert_eq!(
            std::fs::read_to_string(&written[0]).unwrap(),
            "namespace MyApp { class MyAppApp {} }"
        );
    }

    #[test]
    fn test_binary_files_are_copied_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let bytes = [0xff, 0xfe, b'$', 0x00, 0x80];
        let icon = source_file(temp_dir.path(), "app.ico", &bytes);
        let entry = template_with(vec![TemplateFile {
            source_path: icon,
            destination_path: "app.ico".into(),
        }]);

        let target = temp_dir.path().join("out");
        ProjectCreator::new()
            .create("MyApp", &target, &entry.as_template().unwrap())
            .unwrap();

        assert_eq!(std::fs::read(target.join("app.ico")).unwrap(), bytes);
    }

    #[test]
    fn test_non_empty_target_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("existing.txt"), "keep").unwrap();

        let entry = template_with(vec![]);
        let err = ProjectCreator::new()
            .create("MyApp", &target, &entry.as_template().unwrap())
            .unwrap_err();

        assert!(matches!(err, ProjectError::TargetNotEmpty(_)));
        assert_eq!(std::fs::read_to_string(target.join("existing.txt")).unwrap(), "keep");
    }

    #[test]
    fn test_existing_empty_target_is_used() {
        let temp_dir = TempDir::new().unwrap();
        let readme = source_file(temp_dir.path(), "README.md", b"# $DefaultNamespace$");
        let target = temp_dir.path().join("out");
        std::fs::create_dir_all(&target).unwrap();

        let entry = template_with(vec![TemplateFile {
            source_path: readme,
            destination_path: "README.md".into(),
        }]);
        ProjectCreator::new()
            .create("Demo", &target, &entry.as_template().unwrap())
            .unwrap();

        assert_eq!(std::fs::read_to_string(target.join("README.md")).unwrap(), "# Demo");
    }

    #[test]
    fn test_escaping_destination_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let readme = source_file(temp_dir.path(), "README.md", b"x");
        let target = temp_dir.path().join("out");

        let entry = template_with(vec![TemplateFile {
            source_path: readme,
            destination_path: "../README.md".into(),
        }]);
        let err = ProjectCreator::new()
            .create("Demo", &target, &entry.as_template().unwrap())
            .unwrap_err();

        assert!(matches!(err, ProjectError::UnsafeDestination(_)));
        assert!(!target.exists());
    }
}
