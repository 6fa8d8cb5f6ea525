//! Page-level view state for the starter front end.
//!
//! Each page owns its own state, talks to the API through an [`ApiClient`]
//! and reports what the UI should do next as a list of [`Effect`]s. No retry,
//! no de-duplication of overlapping submits.

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

pub mod dashboard;
pub mod home;
pub mod upload;

pub use dashboard::{DashboardPage, QueryExchange};
pub use home::{FormMode, FormRecord, HomePage};
pub use upload::{SelectedFile, UploadPage};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const UPLOAD_PATH: &str = "/api/upload";
pub const LLM_PATH: &str = "/api/llm";

/// Where a page can send the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Dashboard,
    Upload,
}

/// What the UI should do after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Blocking message box.
    Alert(String),
    Navigate(Route),
    /// Submit stopped before any request; lists the empty required fields.
    Invalid(Vec<&'static str>),
}

/// Status and raw body of one API call.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> anyhow::Result<T> {
        serde_json::from_slice(&self.body).context("decode response body")
    }
}

/// Transport used by the pages. `Err` means the request never produced an
/// HTTP response.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn post_json(&self, path: &str, body: serde_json::Value) -> anyhow::Result<ApiResponse>;
    async fn post_file(&self, path: &str, field: &str, file: &SelectedFile) -> anyhow::Result<ApiResponse>;
}

/// `ApiClient` over HTTP.
#[derive(Clone)]
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn post_json(&self, path: &str, body: serde_json::Value) -> anyhow::Result<ApiResponse> {
        let res = self
            .http
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?;
        let status = res.status().as_u16();
        let body = res.bytes().await.context("read response body")?;
        debug!(path, status, "api call finished");
        Ok(ApiResponse { status, body })
    }

    async fn post_file(&self, path: &str, field: &str, file: &SelectedFile) -> anyhow::Result<ApiResponse> {
        let part = Part::bytes(file.data.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .context("invalid content type")?;
        let form = Form::new().part(field.to_string(), part);
        let res = self
            .http
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("POST {path}"))?;
        let status = res.status().as_u16();
        let body = res.bytes().await.context("read response body")?;
        debug!(path, status, "upload finished");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request},
        Router,
    };
    use bytes::Bytes;
    use tower::ServiceExt;

    use super::{ApiClient, ApiResponse, SelectedFile};
    use crate::{
        app::build_app,
        state::AppState,
        test_support::{json_request, multipart_body_typed, BOUNDARY},
    };

    /// Drives the real router in-process and records every path it was asked
    /// to hit.
    pub struct RouterClient {
        router: Router,
        calls: Mutex<Vec<String>>,
        bodies: Mutex<Vec<serde_json::Value>>,
    }

    impl RouterClient {
        pub fn new(state: AppState) -> Self {
            Self {
                router: build_app(state),
                calls: Mutex::new(Vec::new()),
                bodies: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Last JSON body sent through `post_json`.
        pub fn last_body(&self) -> Option<serde_json::Value> {
            self.bodies.lock().unwrap().last().cloned()
        }

        async fn run(&self, path: &str, req: Request<Body>) -> anyhow::Result<ApiResponse> {
            self.calls.lock().unwrap().push(path.to_string());
            let res = self.router.clone().oneshot(req).await?;
            let status = res.status().as_u16();
            let body = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
            Ok(ApiResponse { status, body })
        }
    }

    #[async_trait]
    impl ApiClient for RouterClient {
        async fn post_json(&self, path: &str, body: serde_json::Value) -> anyhow::Result<ApiResponse> {
            self.bodies.lock().unwrap().push(body.clone());
            self.run(path, json_request(Method::POST, path, body)).await
        }

        async fn post_file(&self, path: &str, field: &str, file: &SelectedFile) -> anyhow::Result<ApiResponse> {
            let body = multipart_body_typed(field, Some(&file.name), &file.content_type, &file.data);
            let req = Request::builder()
                .method(Method::POST)
                .uri(path)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))?;
            self.run(path, req).await
        }
    }

    /// Fails every call as if the network were down.
    pub struct OfflineClient;

    #[async_trait]
    impl ApiClient for OfflineClient {
        async fn post_json(&self, path: &str, _body: serde_json::Value) -> anyhow::Result<ApiResponse> {
            anyhow::bail!("connection refused: {path}")
        }

        async fn post_file(&self, path: &str, _field: &str, _file: &SelectedFile) -> anyhow::Result<ApiResponse> {
            anyhow::bail!("connection refused: {path}")
        }
    }

    /// Answers every call with a fixed status and body.
    pub struct FixedClient {
        pub status: u16,
        pub body: &'static [u8],
    }

    #[async_trait]
    impl ApiClient for FixedClient {
        async fn post_json(&self, _path: &str, _body: serde_json::Value) -> anyhow::Result<ApiResponse> {
            Ok(ApiResponse {
                status: self.status,
                body: Bytes::from_static(self.body),
            })
        }

        async fn post_file(&self, _path: &str, _field: &str, _file: &SelectedFile) -> anyhow::Result<ApiResponse> {
            Ok(ApiResponse {
                status: self.status,
                body: Bytes::from_static(self.body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, state::AppState};

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_app(AppState::fake())).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn local_client(base_url: String) -> HttpApiClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpApiClient::with_client(http, base_url)
    }

    #[test]
    fn success_range() {
        let res = |status| ApiResponse {
            status,
            body: Bytes::new(),
        };
        assert!(res(200).is_success());
        assert!(res(204).is_success());
        assert!(!res(400).is_success());
        assert!(!res(500).is_success());
    }

    #[tokio::test]
    async fn http_client_talks_to_a_live_server() {
        let client = local_client(spawn_server().await);

        let res = client
            .post_json(LOGIN_PATH, serde_json::json!({"username":"amy","password":"pw"}))
            .await
            .unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.json::<serde_json::Value>().unwrap()["ok"], true);

        let res = client
            .post_json(LOGIN_PATH, serde_json::json!({"username":"amy"}))
            .await
            .unwrap();
        assert_eq!(res.status, 400);

        let file = SelectedFile::new("report.pdf", "application/pdf", Bytes::from_static(b"%PDF"));
        let res = client.post_file(UPLOAD_PATH, "file", &file).await.unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(
            res.json::<serde_json::Value>().unwrap()["filename"],
            "report.pdf"
        );
    }

    #[tokio::test]
    async fn http_client_reports_unreachable_server() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = local_client(format!("http://{addr}"));
        assert!(client
            .post_json(LLM_PATH, serde_json::json!({"prompt":"hi"}))
            .await
            .is_err());
    }
}
