//! Test helper functions for integration tests
//!
//! Shared across the test files using the tests/common/ pattern.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::path::{Path, PathBuf};
use std::sync::Once;
use stencil_core::config::{StencilPaths, StoreConfig};
use stencil_core::package::FeedRestorer;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// A stencil home and a feed directory inside one temp dir
pub struct TestStore {
    pub paths: StencilPaths,
    pub feed: PathBuf,
}

impl TestStore {
    pub fn new(root: &Path) -> Self {
        let paths = StencilPaths::from_root(root.join("home"));
        let feed = root.join("feed");
        std::fs::create_dir_all(&feed).unwrap();

        let mut config = StoreConfig::default();
        config.add_feed(feed.clone());
        config.save(&paths.config).unwrap();

        Self { paths, feed }
    }

    /// Publish a package archive to the feed
    pub fn publish(&self, id: &str, version: &str, files: &[(&str, &[u8])]) {
        write_package_archive(&self.feed, id, version, files);
    }
}

/// Write `<feed>/<id>.<version>.tar.gz` holding the given files
pub fn write_package_archive(feed: &Path, id: &str, version: &str, files: &[(&str, &[u8])]) {
    let archive = feed.join(FeedRestorer::archive_name(id, version));
    let file = std::fs::File::create(archive).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *content).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap();
}

/// Manifest with a single root console template
#[allow(dead_code)]
pub const CONSOLE_MANIFEST: &str = r#"{
  "projectTemplates": {
    "console": { "title": "Console App" }
  }
}"#;

/// Manifest with a web category holding two templates
#[allow(dead_code)]
pub const WEB_MANIFEST: &str = r#"{
  "projectTemplates": {
    "web": {
      "title": "ASP.NET Core",
      "children": {
        "empty": { "title": "Empty" },
        "mvc": { "title": "MVC" }
      }
    }
  }
}"#;
