use std::sync::Arc;

use crate::{
    auth::{AuthService, MemoryAuthService, StubAuthService},
    config::{AppConfig, AuthBackend, StorageBackend},
    llm::{InferenceService, TemplateInference},
    storage::{DiscardStorage, S3Storage, StorageService},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: Arc<dyn AuthService>,
    pub storage: Arc<dyn StorageService>,
    pub inference: Arc<dyn InferenceService>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let auth = match &config.auth {
            AuthBackend::Stub => Arc::new(StubAuthService) as Arc<dyn AuthService>,
            AuthBackend::Memory(jwt) => Arc::new(MemoryAuthService::new(jwt)) as Arc<dyn AuthService>,
        };

        let storage = match &config.storage {
            StorageBackend::Discard => Arc::new(DiscardStorage) as Arc<dyn StorageService>,
            StorageBackend::S3(s3) => Arc::new(S3Storage::new(s3).await?) as Arc<dyn StorageService>,
        };

        let inference =
            Arc::new(TemplateInference::new(config.llm_template.clone())) as Arc<dyn InferenceService>;

        tracing::info!(
            auth = config.auth.name(),
            storage = config.storage.name(),
            "services ready"
        );

        Ok(Self::from_parts(Arc::new(config.clone()), auth, storage, inference))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        auth: Arc<dyn AuthService>,
        storage: Arc<dyn StorageService>,
        inference: Arc<dyn InferenceService>,
    ) -> Self {
        Self {
            config,
            auth,
            storage,
            inference,
        }
    }

    /// Default stubs everywhere; no I/O.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig::default());
        let inference = Arc::new(TemplateInference::new(config.llm_template.clone()));
        Self::from_parts(
            config,
            Arc::new(StubAuthService),
            Arc::new(DiscardStorage),
            inference,
        )
    }
}
