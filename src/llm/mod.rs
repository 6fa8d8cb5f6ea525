pub mod dto;
pub mod handlers;
pub mod services;

pub use services::{InferenceService, TemplateInference};

use crate::state::AppState;
use axum::Router;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().merge(handlers::llm_routes(max_bytes))
}
