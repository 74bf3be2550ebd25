use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    errors::AppError,
    extractors::AppJson,
    middlewares::auth::{JwtClaims, JwtService},
    models::user::{LoginRequest, SignupRequest},
    services::{auth_service::AuthService, AppState},
};

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    tracing::info!(email = %req.email, "Registering new user");

    let response = auth_service(&state).signup(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    tracing::info!(email = %req.email, "Login attempt");

    let response = auth_service(&state).login(req).await?;

    Ok(Json(response))
}

/// GET /api/auth/dashboard - requires a valid bearer token
pub async fn dashboard(Extension(claims): Extension<JwtClaims>) -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to your dashboard!",
        "userId": claims.sub,
    }))
}

fn auth_service(state: &AppState) -> AuthService {
    let jwt_service = JwtService::new(
        &state.config.jwt_secret,
        &state.config.jwt_refresh_secret,
    );
    AuthService::new(state.mongo.clone(), jwt_service)
}
