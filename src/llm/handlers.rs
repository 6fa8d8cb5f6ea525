use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::AppError,
    llm::dto::{LlmRequest, LlmResponse},
    state::AppState,
};

/// Prompts share the upload size cap rather than axum's 2 MiB default.
pub fn llm_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/llm", post(query))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// An unreadable body is answered as an empty prompt.
#[instrument(skip_all)]
pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<LlmRequest>, JsonRejection>,
) -> Result<Json<LlmResponse>, AppError> {
    let LlmRequest { prompt } = match payload {
        Ok(Json(body)) => body,
        Err(e) => {
            warn!(error = %e, "llm body rejected; using empty prompt");
            LlmRequest::default()
        }
    };

    let text = state.inference.complete(&prompt).await?;

    info!(prompt_len = prompt.len(), "llm query answered");
    Ok(Json(LlmResponse { text }))
}
