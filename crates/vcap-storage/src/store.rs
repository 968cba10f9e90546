//! The object store capability.

use std::path::Path;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Keyed blob namespace the worker reads inputs from and writes outputs to.
///
/// Both operations fail loudly: a missing key, an auth failure or a network
/// error is returned to the caller, never papered over.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch `key` into the local file at `path`.
    ///
    /// On error no partial file is left at `path`.
    async fn download(&self, key: &str, path: &Path) -> StorageResult<()>;

    /// Store the local file at `path` under `key`.
    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}
