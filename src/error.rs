use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::dto::AuthResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("malformed request body")]
    MalformedBody,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("user not found")]
    UnknownUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("multipart parse error: {0}")]
    Multipart(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::MissingField(_)
            | AppError::MalformedBody
            | AppError::UserAlreadyExists
            | AppError::UnknownUser => {
                (StatusCode::BAD_REQUEST, Json(AuthResponse::rejected())).into_response()
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, Json(AuthResponse::rejected())).into_response()
            }
            // 5xx carry no body; details go to the log only.
            AppError::Multipart(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
