use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
mod password;
pub mod services;

pub use services::{AuthService, MemoryAuthService, Session, StubAuthService};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
