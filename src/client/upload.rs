use bytes::Bytes;
use tracing::warn;

use super::{ApiClient, Effect, Route, UPLOAD_PATH};

/// A file picked in the browser.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadPage {
    pub file: Option<SelectedFile>,
}

impl UploadPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, file: SelectedFile) {
        self.file = Some(file);
    }

    pub async fn submit(&mut self, api: &dyn ApiClient) -> Vec<Effect> {
        let Some(file) = &self.file else {
            return vec![Effect::Alert("Please select a file first".into())];
        };

        match api.post_file(UPLOAD_PATH, "file", file).await {
            Ok(res) if res.is_success() => vec![
                Effect::Alert("File uploaded".into()),
                Effect::Navigate(Route::Dashboard),
            ],
            Ok(res) => {
                warn!(status = res.status, filename = %file.name, "upload rejected");
                vec![Effect::Alert("Upload failed".into())]
            }
            Err(e) => {
                warn!(error = %e, filename = %file.name, "upload failed");
                vec![Effect::Alert("Upload failed".into())]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::testing::{FixedClient, OfflineClient, RouterClient},
        state::AppState,
    };

    fn report() -> SelectedFile {
        SelectedFile::new("report.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.7"))
    }

    #[tokio::test]
    async fn no_file_alerts_without_request() {
        let api = RouterClient::new(AppState::fake());
        let mut page = UploadPage::new();
        let effects = page.submit(&api).await;
        assert_eq!(effects, vec![Effect::Alert("Please select a file first".into())]);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn success_alerts_then_navigates() {
        let api = RouterClient::new(AppState::fake());
        let mut page = UploadPage::new();
        page.select(report());

        let effects = page.submit(&api).await;
        assert_eq!(
            effects,
            vec![
                Effect::Alert("File uploaded".into()),
                Effect::Navigate(Route::Dashboard),
            ]
        );
        assert_eq!(api.calls(), vec![UPLOAD_PATH.to_string()]);
        assert_eq!(page.file.as_ref().map(|f| f.name.as_str()), Some("report.pdf"));
    }

    #[tokio::test]
    async fn server_error_alerts() {
        let api = FixedClient {
            status: 500,
            body: b"",
        };
        let mut page = UploadPage::new();
        page.select(report());
        assert_eq!(
            page.submit(&api).await,
            vec![Effect::Alert("Upload failed".into())]
        );
    }

    #[tokio::test]
    async fn transport_error_alerts() {
        let mut page = UploadPage::new();
        page.select(report());
        assert_eq!(
            page.submit(&OfflineClient).await,
            vec![Effect::Alert("Upload failed".into())]
        );
    }
}
