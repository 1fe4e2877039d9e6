//! Stencil home discovery and store configuration
//!
//! The stencil home holds the declared dependencies, the restore lock, the
//! extracted packages and the feed configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Environment variable overriding the stencil home
pub const HOME_ENV_VAR: &str = "STENCIL_HOME";

const DEPENDENCIES_FILE: &str = "templates.yaml";
const LOCK_FILE: &str = "templates.lock";
const CONFIG_FILE: &str = "config.yaml";
const PACKAGES_DIR: &str = "packages";
const DEFAULT_FEED_DIR: &str = "feed";

/// Locations inside the stencil home
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StencilPaths {
    /// Root of the stencil home
    pub root: PathBuf,
    /// Declared template packages (templates.yaml)
    pub dependencies: PathBuf,
    /// Restore lock (templates.lock)
    pub lock: PathBuf,
    /// Store configuration (config.yaml)
    pub config: PathBuf,
    /// Extracted packages, one directory per id and version
    pub packages: PathBuf,
}

impl StencilPaths {
    /// Discover the stencil home
    ///
    /// Resolution order:
    /// 1. CLI override (if provided)
    /// 2. `STENCIL_HOME` environment variable
    /// 3. Platform-specific user data directory
    pub fn discover(cli_override: Option<PathBuf>) -> Result<Self> {
        if let Some(root) = cli_override {
            debug!("Using --home override: {}", root.display());
            return Ok(Self::from_root(root));
        }

        if let Some(root) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            let root = PathBuf::from(root);
            debug!("Using {} override: {}", HOME_ENV_VAR, root.display());
            return Ok(Self::from_root(root));
        }

        let root = Self::platform_data_dir()?;
        trace!("Using platform stencil home: {}", root.display());
        Ok(Self::from_root(root))
    }

    /// Build the paths for a given home directory
    pub fn from_root(root: PathBuf) -> Self {
        Self {
            dependencies: root.join(DEPENDENCIES_FILE),
            lock: root.join(LOCK_FILE),
            config: root.join(CONFIG_FILE),
            packages: root.join(PACKAGES_DIR),
            root,
        }
    }

    /// Directory a package version is extracted to
    pub fn package_dir(&self, id: &str, version: &str) -> PathBuf {
        self.packages.join(id).join(version)
    }

    /// Feed used when no feeds are configured
    pub fn default_feed(&self) -> PathBuf {
        self.root.join(DEFAULT_FEED_DIR)
    }

    fn platform_data_dir() -> Result<PathBuf> {
        // On Linux: ~/.local/share/stencil
        // On macOS: ~/Library/Application Support/dev.stencil.stencil
        // On Windows: %APPDATA%\stencil\stencil\data
        directories::ProjectDirs::from("dev", "stencil", "stencil")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .or_else(|| dirs::data_dir().map(|d| d.join("stencil")))
            .context("Could not determine the stencil home directory. Set STENCIL_HOME or pass --home")
    }
}

/// Store configuration file (config.yaml)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directories searched for package archives, in order
    #[serde(default)]
    pub feeds: Vec<PathBuf>,
}

impl StoreConfig {
    /// Load configuration, or the default when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read store config: {}", path.display()))?;

        serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse store config: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self).context("Failed to serialize store config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write store config: {}", path.display()))
    }

    /// Feeds to search, falling back to the home's default feed
    pub fn effective_feeds(&self, paths: &StencilPaths) -> Vec<PathBuf> {
        if self.feeds.is_empty() {
            vec![paths.default_feed()]
        } else {
            self.feeds.clone()
        }
    }

    /// Add a feed directory; returns false if it was already configured
    pub fn add_feed(&mut self, feed: PathBuf) -> bool {
        if self.feeds.contains(&feed) {
            return false;
        }
        self.feeds.push(feed);
        true
    }

    /// Remove a feed directory
    pub fn remove_feed(&mut self, feed: &Path) -> Result<()> {
        let before = self.feeds.len();
        self.feeds.retain(|f| f != feed);

        if self.feeds.len() == before {
            anyhow::bail!("Feed '{}' is not configured", feed.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_layout_under_root() {
        let paths = StencilPaths::from_root(PathBuf::from("/home/me/.stencil"));
        assert_eq!(paths.dependencies, PathBuf::from("/home/me/.stencil/templates.yaml"));
        assert_eq!(paths.lock, PathBuf::from("/home/me/.stencil/templates.lock"));
        assert_eq!(
            paths.package_dir("Web", "1.0.0"),
            PathBuf::from("/home/me/.stencil/packages/Web/1.0.0")
        );
        assert_eq!(paths.default_feed(), PathBuf::from("/home/me/.stencil/feed"));
    }

    #[test]
    #[serial]
    fn test_cli_override_wins_over_env() {
        std::env::set_var(HOME_ENV_VAR, "/from/env");
        let paths = StencilPaths::discover(Some(PathBuf::from("/from/cli"))).unwrap();
        std::env::remove_var(HOME_ENV_VAR);

        assert_eq!(paths.root, PathBuf::from("/from/cli"));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        std::env::set_var(HOME_ENV_VAR, "/from/env");
        let paths = StencilPaths::discover(None).unwrap();
        std::env::remove_var(HOME_ENV_VAR);

        assert_eq!(paths.root, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_missing_config_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig::load(&temp_dir.path().join("config.yaml")).unwrap();
        assert!(config.feeds.is_empty());

        let paths = StencilPaths::from_root(temp_dir.path().to_path_buf());
        assert_eq!(config.effective_feeds(&paths), vec![paths.default_feed()]);
    }

    #[test]
    fn test_feeds_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        let mut config = StoreConfig::default();
        assert!(config.add_feed(PathBuf::from("/feeds/local")));
        assert!(!config.add_feed(PathBuf::from("/feeds/local")));
        assert!(config.add_feed(PathBuf::from("/feeds/shared")));
        config.save(&path).unwrap();

        let mut loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        loaded.remove_feed(Path::new("/feeds/local")).unwrap();
        assert_eq!(loaded.feeds, vec![PathBuf::from("/feeds/shared")]);
        assert!(loaded.remove_feed(Path::new("/feeds/local")).is_err());
    }
}
