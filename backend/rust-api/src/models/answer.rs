use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{bson_datetime_as_chrono, ScoreSummary, SessionConfig};

/// Placeholder recorded for questions the user never answered.
pub const NOT_ANSWERED: &str = "Not Answered";

/// Default labels for answers missing categorical tags.
pub const UNTAGGED_TOPIC: &str = "Untagged";
pub const UNKNOWN_LABEL: &str = "Unknown";

/// One graded answer. Immutable once submitted. Categorical fields carry
/// explicit defaults so downstream grouping never falls back at call sites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question_id: String,
    #[serde(default)]
    pub question_text: String,
    pub selected_option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<String>,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default = "untagged", deserialize_with = "label_or_untagged")]
    pub topic: String,
    #[serde(
        rename = "type",
        default = "unknown",
        deserialize_with = "label_or_unknown"
    )]
    pub kind: String,
    #[serde(default = "unknown", deserialize_with = "label_or_unknown")]
    pub difficulty: String,
}

fn untagged() -> String {
    UNTAGGED_TOPIC.to_string()
}

fn unknown() -> String {
    UNKNOWN_LABEL.to_string()
}

fn label_or_default<'de, D>(deserializer: D, default: &str) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| default.to_string()))
}

fn label_or_untagged<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    label_or_default(deserializer, UNTAGGED_TOPIC)
}

fn label_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    label_or_default(deserializer, UNKNOWN_LABEL)
}

/// Document shape of the "responses" collection: one document per
/// submission, append-only. Repeated submissions for a session id
/// accumulate as separate documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDocument {
    pub session_id: String,
    pub answers: Vec<AnswerRecord>,
    pub metadata: SessionConfig,
    #[serde(with = "bson_datetime_as_chrono")]
    pub created_at: DateTime<Utc>,
}

/// POST /api/storeResponses request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponsesRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub answers: Option<Vec<AnswerRecord>>,
    #[serde(default)]
    pub metadata: Option<SessionConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponsesResponse {
    pub message: String,
    pub analysis_report: ScoreSummary,
}
