use crate::errors::AppError;
use crate::models::report::{score_percentage, AnalysisResponse};
use crate::models::{AnalysisReport, AnswerRecord, Breakdown};

use super::response_store::ResponseStore;

/// Session-aggregate analysis: every stored submission for the id is
/// flattened into one answer list before the report is computed, so a
/// session that was submitted more than once sums across its documents.
pub struct AnalysisService<S> {
    store: S,
}

impl<S: ResponseStore> AnalysisService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn analyze(&self, session_id: &str) -> Result<AnalysisResponse, AppError> {
        let documents = self.store.find_by_session(session_id).await?;

        if documents.is_empty() {
            return Err(AppError::NotFound(
                "No responses found for this sessionId".to_string(),
            ));
        }

        let answers: Vec<AnswerRecord> = documents
            .into_iter()
            .flat_map(|document| document.answers)
            .collect();

        let analysis_report = build_report(session_id, &answers);
        let incorrect_answers = answers.into_iter().filter(|a| !a.is_correct).collect();

        Ok(AnalysisResponse {
            analysis_report,
            incorrect_answers,
        })
    }
}

/// Pure aggregation over a flattened answer list; recomputed fresh on
/// every request.
pub fn build_report(session_id: &str, answers: &[AnswerRecord]) -> AnalysisReport {
    let correct_answers = answers.iter().filter(|a| a.is_correct).count();
    let total_questions = answers.len();

    let incorrect: Vec<&AnswerRecord> = answers.iter().filter(|a| !a.is_correct).collect();

    AnalysisReport {
        session_id: session_id.to_string(),
        correct_answers,
        total_questions,
        score_percentage: score_percentage(correct_answers, total_questions),
        topic_breakdown: Breakdown::tally(incorrect.iter().map(|a| a.topic.as_str())),
        type_breakdown: Breakdown::tally(incorrect.iter().map(|a| a.kind.as_str())),
        difficulty_breakdown: Breakdown::tally(incorrect.iter().map(|a| a.difficulty.as_str())),
    }
}
