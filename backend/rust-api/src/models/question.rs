use serde::{Deserialize, Deserializer, Serialize};

use super::Level;

/// Upper bound on questions per generated set.
pub const MAX_QUESTION_COUNT: u32 = 50;

/// One interview question. An empty `options` list marks a free-text
/// question; `correct_option` may then be absent.
///
/// The generator emits `{id, question, options, answer}`; `id` arrives as a
/// JSON number or string and is normalized to a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    #[serde(rename = "question")]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "answer", default, skip_serializing_if = "Option::is_none")]
    pub correct_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl Question {
    pub fn is_free_text(&self) -> bool {
        self.options.is_empty()
    }
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "question id must be a string or number, got {other}"
        ))),
    }
}

/// POST /api/interview/generate request body. Fields are optional so the
/// handler can answer a uniform "Missing required fields" 400; the count
/// accepts a number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default, deserialize_with = "count_from_number_or_string")]
    pub num_questions: Option<u32>,
}

impl GenerateRequest {
    pub fn into_parts(self) -> Result<(String, Level, u32), crate::errors::AppError> {
        use crate::errors::AppError;

        let domain = self
            .domain
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let (domain, level, count) = match (domain, self.level, self.num_questions) {
            (Some(domain), Some(level), Some(count)) if count >= 1 => (domain, level, count),
            _ => return Err(AppError::validation("Missing required fields")),
        };

        if count > MAX_QUESTION_COUNT {
            return Err(AppError::Validation(format!(
                "numQuestions must be between 1 and {MAX_QUESTION_COUNT}"
            )));
        }

        Ok((domain, level, count))
    }
}

fn count_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom("numQuestions must be a non-negative integer")),
        serde_json::Value::String(s) => match s.trim().parse::<u32>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(D::Error::custom("numQuestions must be a number")),
        },
        other => Err(D::Error::custom(format!(
            "numQuestions must be a number, got {other}"
        ))),
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_id_accepts_number_or_string() {
        let numeric: Question =
            serde_json::from_str(r#"{"id": 1, "question": "What is 2+2?", "options": ["3", "4"], "answer": "4"}"#)
                .unwrap();
        assert_eq!(numeric.id, "1");

        let stringy: Question =
            serde_json::from_str(r#"{"id": "q-7", "question": "Define TCP.", "options": [], "answer": null}"#)
                .unwrap();
        assert_eq!(stringy.id, "q-7");
        assert!(stringy.is_free_text());
    }

    #[test]
    fn generate_request_parses_string_counts() {
        let req: GenerateRequest = serde_json::from_str(
            r#"{"domain": "Java", "level": "easy", "numQuestions": "5"}"#,
        )
        .unwrap();
        let (domain, level, count) = req.into_parts().unwrap();
        assert_eq!(domain, "Java");
        assert_eq!(level, Level::Easy);
        assert_eq!(count, 5);
    }

    #[test]
    fn generate_request_rejects_non_numeric_counts() {
        let result: Result<GenerateRequest, _> = serde_json::from_str(
            r#"{"domain": "Java", "level": "easy", "numQuestions": "five"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_or_zero_fields_fail_validation() {
        let missing: GenerateRequest =
            serde_json::from_str(r#"{"domain": "Java", "level": "easy"}"#).unwrap();
        assert!(missing.into_parts().is_err());

        let zero: GenerateRequest = serde_json::from_str(
            r#"{"domain": "Java", "level": "easy", "numQuestions": 0}"#,
        )
        .unwrap();
        assert!(zero.into_parts().is_err());

        let blank_domain: GenerateRequest = serde_json::from_str(
            r#"{"domain": "   ", "level": "easy", "numQuestions": 2}"#,
        )
        .unwrap();
        assert!(blank_domain.into_parts().is_err());
    }

    #[test]
    fn oversized_count_is_rejected() {
        let req: GenerateRequest = serde_json::from_str(
            r#"{"domain": "Java", "level": "hard", "numQuestions": 51}"#,
        )
        .unwrap();
        assert!(req.into_parts().is_err());
    }
}
