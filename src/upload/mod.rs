pub mod dto;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new().merge(handlers::upload_routes(max_bytes))
}
