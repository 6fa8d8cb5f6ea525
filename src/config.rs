use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 20 * 1024 * 1024;
pub const DEFAULT_LLM_TEMPLATE: &str =
    "Simulated answer to \"{prompt}\". Connect a model to get a real response.";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

/// Which `AuthService` backs the auth routes.
#[derive(Debug, Clone, Deserialize)]
pub enum AuthBackend {
    /// Presence check only, no verification.
    Stub,
    /// Users kept in process memory, passwords hashed, JWT issued.
    Memory(JwtConfig),
}

/// Where uploaded files go.
#[derive(Debug, Clone, Deserialize)]
pub enum StorageBackend {
    Discard,
    S3(S3Config),
}

impl AuthBackend {
    pub fn name(&self) -> &'static str {
        match self {
            AuthBackend::Stub => "stub",
            AuthBackend::Memory(_) => "memory",
        }
    }
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Discard => "discard",
            StorageBackend::S3(_) => "s3",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_max_bytes: usize,
    pub auth: AuthBackend,
    pub storage: StorageBackend,
    pub llm_template: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            auth: AuthBackend::Stub,
            storage: StorageBackend::Discard,
            llm_template: DEFAULT_LLM_TEMPLATE.into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            Err(_) => 8080,
        };
        let upload_max_bytes = std::env::var("UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES);

        let auth = match std::env::var("AUTH_BACKEND").as_deref() {
            Err(_) | Ok("stub") => AuthBackend::Stub,
            Ok("memory") => AuthBackend::Memory(JwtConfig {
                secret: std::env::var("JWT_SECRET")
                    .context("JWT_SECRET is required for AUTH_BACKEND=memory")?,
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutricare".into()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "nutricare-users".into()),
                ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok())
                    .unwrap_or(60),
            }),
            Ok(other) => anyhow::bail!("unknown AUTH_BACKEND {other:?}"),
        };

        let storage = match std::env::var("STORAGE_BACKEND").as_deref() {
            Err(_) | Ok("discard") => StorageBackend::Discard,
            Ok("s3") => StorageBackend::S3(S3Config {
                endpoint: std::env::var("S3_ENDPOINT").context("S3_ENDPOINT")?,
                bucket: std::env::var("S3_BUCKET").context("S3_BUCKET")?,
                access_key: std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY")?,
                secret_key: std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            }),
            Ok(other) => anyhow::bail!("unknown STORAGE_BACKEND {other:?}"),
        };

        let llm_template =
            std::env::var("LLM_RESPONSE_TEMPLATE").unwrap_or_else(|_| DEFAULT_LLM_TEMPLATE.into());

        Ok(Self {
            host,
            port,
            upload_max_bytes,
            auth,
            storage,
            llm_template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_stub_backends() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.upload_max_bytes, 20 * 1024 * 1024);
        assert_eq!(cfg.auth.name(), "stub");
        assert_eq!(cfg.storage.name(), "discard");
        assert!(cfg.llm_template.contains("{prompt}"));
    }
}
