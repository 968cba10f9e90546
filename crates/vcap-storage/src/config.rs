//! Backend selection.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::client::{S3Config, S3Store};
use crate::error::{StorageError, StorageResult};
use crate::local::LocalStore;
use crate::store::ObjectStore;

/// Which object store implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Self-hosted MinIO (S3 API)
    #[default]
    Minio,
    /// Cloudflare R2 (S3 API)
    R2,
    /// Local directory
    Local,
}

impl FromStr for StorageBackend {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "minio" | "s3" => Ok(StorageBackend::Minio),
            "r2" => Ok(StorageBackend::R2),
            "local" | "fs" => Ok(StorageBackend::Local),
            other => Err(StorageError::config_error(format!(
                "Unknown STORAGE_BACKEND: {}",
                other
            ))),
        }
    }
}

/// Resolved storage configuration.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    S3 {
        backend: StorageBackend,
        config: S3Config,
    },
    Local {
        root: PathBuf,
    },
}

impl StorageConfig {
    /// Read `STORAGE_BACKEND` and the matching backend variables.
    pub fn from_env() -> StorageResult<Self> {
        let backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::default(),
        };

        Ok(match backend {
            StorageBackend::Minio => StorageConfig::S3 {
                backend,
                config: S3Config::minio_from_env(),
            },
            StorageBackend::R2 => StorageConfig::S3 {
                backend,
                config: S3Config::r2_from_env()?,
            },
            StorageBackend::Local => StorageConfig::Local {
                root: std::env::var("LOCAL_STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./storage")),
            },
        })
    }
}

/// Construct the configured object store.
pub fn connect(config: StorageConfig) -> Arc<dyn ObjectStore> {
    let store: Arc<dyn ObjectStore> = match config {
        StorageConfig::S3 { config, .. } => Arc::new(S3Store::new(config)),
        StorageConfig::Local { root } => Arc::new(LocalStore::new(root)),
    };
    info!("Object store: {}", store.describe());
    store
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!("minio".parse::<StorageBackend>().unwrap(), StorageBackend::Minio);
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::Minio);
        assert_eq!(" r2 ".parse::<StorageBackend>().unwrap(), StorageBackend::R2);
        assert_eq!("local".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert!("gcs".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_connect_local() {
        let store = connect(StorageConfig::Local {
            root: PathBuf::from("/srv/videos"),
        });
        assert_eq!(store.describe(), "file:///srv/videos");
    }
}
