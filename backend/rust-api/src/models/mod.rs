use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod answer;
pub mod question;
pub mod report;
pub mod user;

pub use answer::{AnswerRecord, SubmissionDocument, NOT_ANSWERED};
pub use question::Question;
pub use report::{AnalysisReport, Breakdown, ScoreSummary};

/// Difficulty level chosen at session setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }
}

/// Per-session configuration. Created once at setup, immutable for the
/// session's lifetime; travels with the submission as `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub session_id: String,
    pub domain: String,
    pub level: Level,
    pub question_count: u32,
    pub timer_minutes: u32,
}

impl SessionConfig {
    /// Build a config with a freshly generated opaque session token.
    pub fn new(
        domain: impl Into<String>,
        level: Level,
        question_count: u32,
        timer_minutes: u32,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            domain: domain.into(),
            level,
            question_count,
            timer_minutes,
        }
    }
}

// Serde converters for chrono::DateTime <-> mongodb::bson::DateTime
pub(crate) mod bson_datetime_as_chrono {
    use chrono::{DateTime, Utc};
    use mongodb::bson;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bson_dt = bson::DateTime::from_millis(date.timestamp_millis());
        bson_dt.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bson_dt = bson::DateTime::deserialize(deserializer)?;
        DateTime::from_timestamp_millis(bson_dt.timestamp_millis())
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))
    }
}
