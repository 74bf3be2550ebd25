use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::{question::MAX_QUESTION_COUNT, Level, Question};

/// Payload shape the model is instructed to return.
#[derive(Debug, Deserialize)]
struct QuestionPayload {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Adapter over the hosted generative model. One prompt, one parse; no
/// caching and no retry, so identical requests re-invoke the model.
pub struct QuestionSource {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl QuestionSource {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.generation_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.gemini_api_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        })
    }

    pub async fn generate(
        &self,
        domain: &str,
        level: Level,
        count: u32,
    ) -> Result<Vec<Question>, AppError> {
        debug_assert!(count >= 1 && count <= MAX_QUESTION_COUNT);

        let prompt = build_prompt(domain, level, count);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        tracing::debug!(%domain, level = level.as_str(), count, "Requesting questions from model");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::GenerationTimeout
                } else {
                    AppError::Generation(format!("request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Generation(format!(
                "model endpoint returned {status}: {error_text}"
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("unreadable response body: {e}")))?;

        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AppError::Generation("model returned no candidates".to_string()))?;

        let questions = parse_questions(&text, count)?;

        tracing::info!(count = questions.len(), %domain, "Generated question set");

        Ok(questions)
    }
}

fn build_prompt(domain: &str, level: Level, count: u32) -> String {
    format!(
        r#"Generate {count} {level} level interview questions on {domain}.
Return the response strictly in this JSON format:
{{
  "questions": [
    {{
      "id": 1,
      "question": "question text",
      "options": ["option1", "option2", "option3", "option4"],
      "answer": "correct option text"
    }}
  ]
}}"#,
        count = count,
        level = level.as_str(),
        domain = domain,
    )
}

/// Parse the model's text into questions: strip markdown code fences,
/// require strict JSON with a `questions` array of exactly `expected`
/// entries, and check every question's option invariant.
pub fn parse_questions(raw: &str, expected: u32) -> Result<Vec<Question>, AppError> {
    let clean = strip_code_fences(raw);

    let payload: QuestionPayload = serde_json::from_str(&clean)
        .map_err(|e| AppError::Generation(format!("response was not valid JSON: {e}")))?;

    if payload.questions.len() != expected as usize {
        return Err(AppError::Generation(format!(
            "expected {expected} questions, model returned {}",
            payload.questions.len()
        )));
    }

    for question in &payload.questions {
        validate_question(question)?;
    }

    Ok(payload.questions)
}

fn strip_code_fences(raw: &str) -> String {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"```(?:json)?").expect("valid fence pattern"));
    fence.replace_all(raw, "").trim().to_string()
}

fn validate_question(question: &Question) -> Result<(), AppError> {
    if question.text.trim().is_empty() {
        return Err(AppError::Generation(format!(
            "question {} has no text",
            question.id
        )));
    }

    if question.is_free_text() {
        return Ok(());
    }

    if question.options.len() < 2 {
        return Err(AppError::Generation(format!(
            "question {} has fewer than two options",
            question.id
        )));
    }

    match &question.correct_option {
        Some(answer) if question.options.contains(answer) => Ok(()),
        _ => Err(AppError::Generation(format!(
            "question {} answer is not among its options",
            question.id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> String {
        r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "Which structure gives O(1) average lookup?",
                    "options": ["Linked list", "Hash map", "Binary heap", "Stack"],
                    "answer": "Hash map"
                },
                {
                    "id": 2,
                    "question": "What does BFS use internally?",
                    "options": ["Stack", "Queue"],
                    "answer": "Queue"
                }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn parses_fenced_payload() {
        let raw = format!("```json\n{}\n```", sample_payload());
        let questions = parse_questions(&raw, 2).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "1");
        assert_eq!(questions[0].correct_option.as_deref(), Some("Hash map"));
    }

    #[test]
    fn parses_unfenced_payload() {
        let questions = parse_questions(&sample_payload(), 2).unwrap();
        assert!(questions
            .iter()
            .all(|q| q.options.contains(q.correct_option.as_ref().unwrap())));
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_questions("Sorry, I cannot help with that.", 2).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn rejects_missing_questions_array() {
        let err = parse_questions(r#"{"items": []}"#, 1).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn rejects_wrong_count() {
        let err = parse_questions(&sample_payload(), 3).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let raw = r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "Pick one.",
                    "options": ["A", "B"],
                    "answer": "C"
                }
            ]
        }"#;
        let err = parse_questions(raw, 1).unwrap_err();
        assert!(matches!(err, AppError::Generation(_)));
    }

    #[test]
    fn accepts_free_text_questions() {
        let raw = r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "Explain ownership in your own words.",
                    "options": []
                }
            ]
        }"#;
        let questions = parse_questions(raw, 1).unwrap();
        assert!(questions[0].is_free_text());
        assert!(questions[0].correct_option.is_none());
    }

    #[test]
    fn rejects_single_option_questions() {
        let raw = r#"{
            "questions": [
                {
                    "id": 1,
                    "question": "Only one choice?",
                    "options": ["A"],
                    "answer": "A"
                }
            ]
        }"#;
        assert!(parse_questions(raw, 1).is_err());
    }

    #[test]
    fn prompt_embeds_configuration() {
        let prompt = build_prompt("Data Structures", Level::Medium, 7);
        assert!(prompt.contains("Generate 7 medium level interview questions on Data Structures."));
        assert!(prompt.contains("\"questions\""));
    }
}
