use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::answer::AnswerRecord;

/// Rounded percentage with the zero-question guard: no questions means 0,
/// never NaN.
pub fn score_percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (correct as f64 / total as f64 * 100.0).round()
    }
}

/// Incorrect-answer counts grouped by one categorical attribute.
///
/// Entries are kept in descending count order; ties stay in
/// first-encounter order. Serializes as a JSON object so clients read it
/// as a plain `{label: count}` map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    entries: Vec<(String, u64)>,
}

impl Breakdown {
    pub fn tally<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries: Vec<(String, u64)> = Vec::new();
        for label in labels {
            match entries.iter_mut().find(|(seen, _)| seen == label) {
                Some((_, count)) => *count += 1,
                None => entries.push((label.to_string(), 1)),
            }
        }
        // Vec::sort_by is stable, so equal counts keep encounter order.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn count(&self, label: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(seen, _)| seen == label)
            .map(|(_, count)| *count)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Breakdown {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, count) in &self.entries {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// Derived per-session report; computed fresh on every request, never
/// stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub session_id: String,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub score_percentage: f64,
    pub topic_breakdown: Breakdown,
    pub type_breakdown: Breakdown,
    pub difficulty_breakdown: Breakdown,
}

/// Totals returned straight from the store endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub correct_answers: usize,
    pub total_questions: usize,
    pub score_percentage: f64,
}

/// POST /api/analysis request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub analysis_report: AnalysisReport,
    pub incorrect_answers: Vec<AnswerRecord>,
}
