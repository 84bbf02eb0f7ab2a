//! File store configuration

use std::path::{Path, PathBuf};

/// Extension appended to each key's file name
pub const DEFAULT_EXTENSION: &str = "json";

/// Configuration for a [`crate::FileStore`]
///
/// # Example
///
/// ```rust
/// use infra_store::StoreConfig;
///
/// let config = StoreConfig::new("/var/lib/premium-desk")
///     .extension("dat")
///     .create_dir(false);
/// assert_eq!(config.extension, "dat");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one file per key
    pub root: PathBuf,
    /// File extension, without the dot
    pub extension: String,
    /// Create `root` if it does not exist
    pub create_dir: bool,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            create_dir: true,
        }
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn create_dir(mut self, create: bool) -> Self {
        self.create_dir = create;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("./data")
    }
}
