//! File-backed key-value store
//!
//! Each key is stored in `<root>/<key>.<extension>`. Writes go to a hidden
//! temporary file in the same directory which is flushed and then renamed
//! over the target.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use core_kernel::{DomainPort, KeyValueStore, PortError};

use crate::config::StoreConfig;
use crate::error::StoreError;

const MAX_KEY_LEN: usize = 128;

/// Durable [`KeyValueStore`] keeping one file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    extension: String,
}

impl FileStore {
    /// Opens a store rooted at `config.root`
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingDirectory`] when the directory is absent and
    /// `create_dir` is off, or an I/O error while creating it.
    pub async fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let exists = fs::try_exists(&config.root)
            .await
            .map_err(|e| StoreError::io(&config.root, e))?;

        if !exists {
            if !config.create_dir {
                return Err(StoreError::MissingDirectory(config.root));
            }
            fs::create_dir_all(&config.root)
                .await
                .map_err(|e| StoreError::io(&config.root, e))?;
            debug!(root = %config.root.display(), "Created storage directory");
        }

        Ok(Self {
            root: config.root,
            extension: config.extension,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{}", self.extension)))
    }

    /// Reads the value stored under `key`
    pub async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StoreError::InvalidUtf8(path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Replaces the value stored under `key`
    #[instrument(skip(self, value), fields(bytes = value.len()))]
    pub async fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self.root.join(format!(".{key}.{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = write_synced(&tmp, value).await {
            discard(&tmp).await;
            return Err(StoreError::io(&tmp, e));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            discard(&tmp).await;
            return Err(StoreError::io(&path, e));
        }

        debug!(path = %path.display(), "Value written");
        Ok(())
    }

    /// Deletes the value stored under `key`; a missing key is not an error
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

async fn write_synced(path: &Path, value: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(value.as_bytes()).await?;
    file.sync_all().await
}

async fn discard(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(path = %tmp.display(), error = %e, "Failed to clean up temporary file");
        }
    }
}

/// Keys become file names, so only a conservative character set is allowed
fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = |reason| StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    };

    if key.is_empty() {
        return Err(invalid("empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(invalid("too long"));
    }
    if key.starts_with('.') {
        return Err(invalid("leading dot"));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("unsupported character"));
    }
    Ok(())
}

impl DomainPort for FileStore {}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.read(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PortError> {
        Ok(self.write(key, value).await?)
    }

    async fn remove(&self, key: &str) -> Result<(), PortError> {
        Ok(self.delete(key).await?)
    }
}
