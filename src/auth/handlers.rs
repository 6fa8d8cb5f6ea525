use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::{AuthResponse, Credentials, CredentialsForm, Profile, ProfileForm},
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsForm>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(form) = payload.map_err(|e| {
        warn!(error = %e, "login body rejected");
        AppError::MalformedBody
    })?;
    let credentials = Credentials::try_from(form).inspect_err(|e| {
        warn!(error = %e, "login rejected");
    })?;
    let username = credentials.username.clone();

    let session = state.auth.login(credentials).await?;

    info!(%username, "user logged in");
    Ok(Json(AuthResponse::accepted(session.token)))
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<ProfileForm>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(form) = payload.map_err(|e| {
        warn!(error = %e, "signup body rejected");
        AppError::MalformedBody
    })?;
    let profile = Profile::try_from(form).inspect_err(|e| {
        warn!(error = %e, "signup rejected");
    })?;
    let username = profile.username.clone();

    let session = state.auth.signup(profile).await?;

    info!(%username, "user signed up");
    Ok(Json(AuthResponse::accepted(session.token)))
}
