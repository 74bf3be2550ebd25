use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    errors::AppError,
    extractors::AppJson,
    models::question::{GenerateRequest, GenerateResponse},
    services::{question_source::QuestionSource, AppState},
};

/// POST /api/interview/generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GenerateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (domain, level, count) = req.into_parts()?;

    tracing::info!(%domain, level = level.as_str(), count, "Generating interview questions");

    let source = QuestionSource::new(&state.config)?;
    let questions = source.generate(&domain, level, count).await?;

    Ok(Json(GenerateResponse {
        success: true,
        questions,
    }))
}
