use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{
    errors::AppError,
    extractors::AppJson,
    models::report::AnalysisRequest,
    services::{analysis::AnalysisService, response_store::MongoResponseStore, AppState},
};

/// POST /api/analysis
pub async fn analysis_report(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AnalysisRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Reject before touching the store.
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("Session ID is required"))?;

    tracing::debug!(%session_id, "Building analysis report");

    let service = AnalysisService::new(MongoResponseStore::new(state.mongo.clone()));
    let response = service.analyze(&session_id).await?;

    Ok(Json(response))
}
