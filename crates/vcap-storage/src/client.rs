//! S3-compatible client implementation (MinIO, Cloudflare R2).

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Configuration for an S3-compatible endpoint.
#[derive(Clone)]
pub struct S3Config {
    /// Endpoint URL including scheme
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("us-east-1" for MinIO, "auto" for R2)
    pub region: String,
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("region", &self.region)
            .finish()
    }
}

impl S3Config {
    /// MinIO profile from `MINIO_*` environment variables.
    ///
    /// Every variable has a default matching the stock docker-compose setup.
    pub fn minio_from_env() -> Self {
        let endpoint = std::env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "minio:9000".to_string());
        let secure = std::env::var("MINIO_SECURE")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            endpoint_url: normalize_endpoint(&endpoint, secure),
            access_key_id: std::env::var("MINIO_ACCESS_KEY")
                .unwrap_or_else(|_| "justicadmin".to_string()),
            secret_access_key: std::env::var("MINIO_SECRET_KEY")
                .unwrap_or_else(|_| "justicadmin123".to_string()),
            bucket_name: std::env::var("MINIO_BUCKET").unwrap_or_else(|_| "videos".to_string()),
            region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        }
    }

    /// Cloudflare R2 profile from `R2_*` environment variables.
    pub fn r2_from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("R2_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("R2_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("R2_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("R2_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("R2_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("R2_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("R2_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("R2_BUCKET_NAME not set"))?,
            region: std::env::var("R2_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }
}

/// Prefix a bare `host:port` endpoint with a scheme.
pub fn normalize_endpoint(endpoint: &str, secure: bool) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else if secure {
        format!("https://{}", endpoint)
    } else {
        format!("http://{}", endpoint)
    }
}

/// S3-compatible object store.
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3Store {
    /// Create a new client from configuration.
    pub fn new(config: S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vcap",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            endpoint: config.endpoint_url,
        }
    }

    /// Bucket this store reads and writes.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn stream_to_file(&self, key: &str, path: &Path) -> StorageResult<u64> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    StorageError::not_found(key)
                } else {
                    StorageError::download_failed(format!("{}: {}", key, DisplayErrorContext(&e)))
                }
            })?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut body = response.body.into_async_read();
        let mut file = tokio::fs::File::create(path).await?;
        let written = tokio::io::copy(&mut body, &mut file)
            .await
            .map_err(|e| StorageError::download_failed(format!("{}: {}", key, e)))?;
        file.flush().await?;

        Ok(written)
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn download(&self, key: &str, path: &Path) -> StorageResult<()> {
        debug!("Downloading {} to {}", key, path.display());

        match self.stream_to_file(key, path).await {
            Ok(bytes) => {
                info!("Downloaded {} ({} bytes) to {}", key, bytes, path.display());
                Ok(())
            }
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(path).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove partial download {}: {}", path.display(), rm);
                    }
                }
                Err(e)
            }
        }
    }

    async fn upload(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()> {
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", path.display(), e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(format!("{}: {}", key, DisplayErrorContext(&e))))?;

        info!("Uploaded {} to {}", path.display(), key);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{} at {}", self.bucket, self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: &str) -> S3Config {
        S3Config {
            endpoint_url: endpoint.to_string(),
            access_key_id: "test".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "videos".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("minio:9000", false), "http://minio:9000");
        assert_eq!(normalize_endpoint("minio:9000", true), "https://minio:9000");
        assert_eq!(
            normalize_endpoint("https://acct.r2.cloudflarestorage.com/", false),
            "https://acct.r2.cloudflarestorage.com"
        );
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let rendered = format!("{:?}", test_config("http://minio:9000"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret\""));
    }

    #[tokio::test]
    async fn test_download_streams_object_to_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos/in/a.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fake mp4 bytes".to_vec()))
            .mount(&server)
            .await;

        let store = S3Store::new(test_config(&server.uri()));
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("input.mp4");

        store.download("in/a.mp4", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"fake mp4 bytes");
    }

    #[tokio::test]
    async fn test_download_missing_key() {
        let server = MockServer::start().await;
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message><Key>in/missing.mp4</Key></Error>"#;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let store = S3Store::new(test_config(&server.uri()));
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("input.mp4");

        let err = store.download("in/missing.mp4", &dest).await.unwrap_err();

        assert!(err.is_not_found(), "unexpected error: {err}");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_truncated_body_removes_partial_file() {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = vec![0u8; 4096];
                let _ = socket.read(&mut request).await;
                let head = "HTTP/1.1 200 OK\r\n\
                            Content-Type: application/octet-stream\r\n\
                            Content-Length: 100000\r\n\r\n";
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(b"only a few bytes").await;
                let _ = socket.shutdown().await;
            }
        });

        let store = S3Store::new(test_config(&format!("http://{}", addr)));
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("input.mp4");

        let result = store.download("in/a.mp4", &dest).await;

        assert!(result.is_err(), "short body was accepted");
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_describe() {
        let store = S3Store::new(test_config("http://minio:9000"));
        assert_eq!(store.describe(), "s3://videos at http://minio:9000");
        assert_eq!(store.bucket(), "videos");
    }
}
