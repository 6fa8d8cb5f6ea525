use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    routing::post,
    Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    error::AppError,
    state::AppState,
    storage::UploadedFile,
    upload::dto::UploadResponse,
};

const FILE_FIELD: &str = "file";

pub fn upload_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// POST /upload (multipart), field `file`. Only the first `file` part is
/// read; other parts are skipped.
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut mp = multipart.map_err(rejected)?;

    let mut filename = None;
    while let Some(field) = mp.next_field().await.map_err(parse_failed)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .map(str::to_owned)
            .unwrap_or_else(|| "application/octet-stream".into());
        let body = field.bytes().await.map_err(parse_failed)?;
        let size = body.len();

        let key = state
            .storage
            .store(UploadedFile {
                filename: name.clone(),
                content_type,
                body,
            })
            .await?;

        info!(filename = ?name, size, key = ?key, "file received");
        filename = name;
        break;
    }

    Ok(Json(UploadResponse { ok: true, filename }))
}

pub(crate) fn rejected(e: MultipartRejection) -> AppError {
    error!(error = %e, "multipart rejected");
    AppError::Multipart(e.to_string())
}

pub(crate) fn parse_failed(e: MultipartError) -> AppError {
    error!(error = %e, "multipart parse failed");
    AppError::Multipart(e.to_string())
}
