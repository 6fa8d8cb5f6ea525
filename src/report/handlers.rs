use anyhow::Context;
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::AppError,
    report::extract::{extract_pdf, ReportExtraction},
    state::AppState,
    upload::handlers::{parse_failed, rejected},
};

const FILE_FIELD: &str = "file";

pub fn report_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/report", post(extract_report))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// POST /report (multipart), field `file`. Always 200 once the body parses;
/// an unreadable PDF or a missing part comes back with `success: false`.
#[instrument(skip_all)]
pub async fn extract_report(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ReportExtraction>, AppError> {
    let mut mp = multipart.map_err(rejected)?;

    while let Some(field) = mp.next_field().await.map_err(parse_failed)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("report.pdf").to_owned();
        let body = field.bytes().await.map_err(parse_failed)?;
        info!(file = %name, size = body.len(), "report received");

        let extraction = tokio::task::spawn_blocking(move || extract_pdf(&name, &body))
            .await
            .context("report extraction task")?;
        return Ok(Json(extraction));
    }

    Ok(Json(ReportExtraction::failed("", "No file uploaded")))
}
