use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

use crate::config::S3Config;

/// A file received by the upload route.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: String,
    pub body: Bytes,
}

/// Backend behind `/upload`.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Accepts the file and returns the key it was stored under, if any.
    async fn store(&self, file: UploadedFile) -> anyhow::Result<Option<String>>;
}

/// Reads the upload and drops it.
#[derive(Debug, Clone, Default)]
pub struct DiscardStorage;

#[async_trait]
impl StorageService for DiscardStorage {
    async fn store(&self, file: UploadedFile) -> anyhow::Result<Option<String>> {
        debug!(
            filename = ?file.filename,
            size = file.body.len(),
            "upload discarded"
        );
        Ok(None)
    }
}

/// S3-compatible bucket (MinIO and friends), path-style addressing.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn new(cfg: &S3Config) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageService for S3Storage {
    async fn store(&self, file: UploadedFile) -> anyhow::Result<Option<String>> {
        let key = object_key(Uuid::new_v4(), file.filename.as_deref());
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file.body))
            .content_type(&file.content_type)
            .send()
            .await
            .with_context(|| format!("s3 put_object {key}"))?;
        Ok(Some(key))
    }
}

/// `uploads/<id>-<name>`; path separators in the client-supplied name are
/// replaced so it cannot escape the prefix.
fn object_key(id: Uuid, filename: Option<&str>) -> String {
    match filename.filter(|n| !n.is_empty()) {
        Some(name) => {
            let safe: String = name
                .chars()
                .map(|c| if c == '/' || c == '\\' { '_' } else { c })
                .collect();
            format!("uploads/{id}-{safe}")
        }
        None => format!("uploads/{id}"),
    }
}
