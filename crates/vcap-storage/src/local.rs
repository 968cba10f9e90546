//! Local-filesystem object store.
//!
//! Keys map to relative paths under a root directory. Intended for
//! development without an object-storage service and for tests.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Object store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path under the root.
    ///
    /// Empty keys, absolute keys and keys that climb out of the root with
    /// `..` are rejected.
    pub fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        if key.trim().is_empty() {
            return Err(StorageError::invalid_key(key));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(StorageError::invalid_key(key)),
            }
        }
        Ok(self.root.join(relative))
    }

    /// Whether an object exists under `key`.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.object_path(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn download(&self, key: &str, path: &Path) -> StorageResult<()> {
        let source = self.object_path(key)?;
        if !tokio::fs::try_exists(&source).await? {
            return Err(StorageError::not_found(key));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if let Err(e) = tokio::fs::copy(&source, path).await {
            let _ = tokio::fs::remove_file(path).await;
            return Err(StorageError::download_failed(format!("{}: {}", key, e)));
        }

        debug!("Copied {} to {}", source.display(), path.display());
        Ok(())
    }

    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()> {
        let dest = self.object_path(key)?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Stage next to the destination, then rename, so a failed copy never
        // leaves a truncated object under the key.
        let staging = dest.with_file_name(format!(".upload-{}", Uuid::new_v4()));
        if let Err(e) = tokio::fs::copy(path, &staging).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StorageError::upload_failed(format!("{}: {}", path.display(), e)));
        }
        if let Err(e) = tokio::fs::rename(&staging, &dest).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StorageError::upload_failed(format!("{}: {}", key, e)));
        }

        info!("Stored {} as {} ({})", path.display(), key, content_type);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }
}
