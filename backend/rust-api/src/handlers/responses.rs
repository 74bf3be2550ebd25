use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    errors::AppError,
    extractors::AppJson,
    models::answer::{StoreResponsesRequest, StoreResponsesResponse},
    models::report::score_percentage,
    models::{ScoreSummary, SubmissionDocument},
    services::{
        response_store::{MongoResponseStore, ResponseStore},
        AppState,
    },
};

/// POST /api/storeResponses
///
/// Persists one submission document and echoes the score totals back.
/// Intentionally append-only: a retried submission lands as a second
/// document for the same session id.
pub async fn store_responses(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<StoreResponsesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("Session ID is required"))?;
    let answers = req
        .answers
        .ok_or_else(|| AppError::validation("answers must be a list"))?;
    let metadata = req
        .metadata
        .ok_or_else(|| AppError::validation("metadata is required"))?;

    let correct_answers = answers.iter().filter(|a| a.is_correct).count();
    let total_questions = answers.len();
    let analysis_report = ScoreSummary {
        correct_answers,
        total_questions,
        score_percentage: score_percentage(correct_answers, total_questions),
    };

    let submission = SubmissionDocument {
        session_id,
        answers,
        metadata,
        created_at: Utc::now(),
    };

    let store = MongoResponseStore::new(state.mongo.clone());
    store.store(&submission).await?;

    Ok(Json(StoreResponsesResponse {
        message: "Responses stored successfully".to_string(),
        analysis_report,
    }))
}
