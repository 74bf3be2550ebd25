//! Session-scoped interview lifecycle: one configured, timed run through a
//! question set, ending in exactly one finalized answer set.
//!
//! Single-threaded and event-driven; callers pass explicit instants so the
//! countdown is driven by whoever owns the clock (a UI tick loop, a test).

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::models::answer::{UNKNOWN_LABEL, UNTAGGED_TOPIC};
use crate::models::report::score_percentage;
use crate::models::{AnswerRecord, Question, SessionConfig, SubmissionDocument, NOT_ANSWERED};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Configuring,
    LoadingQuestions,
    InProgress,
    Submitting,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionTrigger {
    Manual,
    TimerExpired,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question count and timer must both be at least 1")]
    InvalidConfig,
    #[error("operation not allowed in the {0:?} phase")]
    WrongPhase(SessionPhase),
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),
}

/// An in-progress selection for one question; re-selecting overwrites both
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftAnswer {
    pub selected_option: String,
    pub timestamp: DateTime<Utc>,
}

/// The single answer set a session produces, ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedSubmission {
    pub session_id: String,
    pub answers: Vec<AnswerRecord>,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub score_percentage: f64,
    pub trigger: SubmissionTrigger,
}

impl FinalizedSubmission {
    pub fn into_document(
        self,
        metadata: SessionConfig,
        created_at: DateTime<Utc>,
    ) -> SubmissionDocument {
        SubmissionDocument {
            session_id: self.session_id,
            answers: self.answers,
            metadata,
            created_at,
        }
    }
}

/// State machine for one session:
/// `Configuring -> LoadingQuestions -> InProgress -> Submitting -> Complete`.
///
/// Manual submission and timer expiry race for the same latch; whichever
/// lands first finalizes the answer set and the loser gets `None`.
pub struct InterviewSession {
    config: SessionConfig,
    phase: SessionPhase,
    questions: Vec<Question>,
    drafts: HashMap<String, DraftAnswer>,
    current_index: usize,
    deadline: Option<DateTime<Utc>>,
}

impl InterviewSession {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        if config.question_count < 1 || config.timer_minutes < 1 {
            return Err(SessionError::InvalidConfig);
        }

        Ok(Self {
            config,
            phase: SessionPhase::Configuring,
            questions: Vec::new(),
            drafts: HashMap::new(),
            current_index: 0,
            deadline: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answer(&self, question_id: &str) -> Option<&DraftAnswer> {
        self.drafts.get(question_id)
    }

    pub fn begin_loading(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Configuring {
            return Err(SessionError::WrongPhase(self.phase));
        }
        self.phase = SessionPhase::LoadingQuestions;
        Ok(())
    }

    /// Questions arrived; the countdown starts now.
    pub fn questions_ready(
        &mut self,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::LoadingQuestions {
            return Err(SessionError::WrongPhase(self.phase));
        }
        self.questions = questions;
        self.deadline = Some(now + Duration::minutes(i64::from(self.config.timer_minutes)));
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    /// Generation failed; back to the configuration screen.
    pub fn loading_failed(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::LoadingQuestions {
            return Err(SessionError::WrongPhase(self.phase));
        }
        self.phase = SessionPhase::Configuring;
        Ok(())
    }

    /// Upsert the selection for a question. A new pick overwrites the
    /// previous option and timestamp.
    pub fn select_option(
        &mut self,
        question_id: &str,
        option: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.phase != SessionPhase::InProgress {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if !self.questions.iter().any(|q| q.id == question_id) {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }

        self.drafts.insert(
            question_id.to_string(),
            DraftAnswer {
                selected_option: option.into(),
                timestamp: now,
            },
        );
        Ok(())
    }

    /// Navigation moves the displayed index only; answers are untouched.
    pub fn next_question(&mut self) {
        self.current_index = (self.current_index + 1).min(self.questions.len().saturating_sub(1));
    }

    pub fn previous_question(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    pub fn go_to(&mut self, index: usize) {
        self.current_index = index.min(self.questions.len().saturating_sub(1));
    }

    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        self.deadline
            .map(|deadline| (deadline - now).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    /// Explicit user submission. Returns the finalized answer set on the
    /// first trigger, `None` once the latch is taken.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<FinalizedSubmission> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        Some(self.finalize(now, SubmissionTrigger::Manual))
    }

    /// Countdown tick. Finalizes iff the deadline has passed and nothing
    /// else finalized first, so a late tick after a manual submit is a
    /// no-op.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<FinalizedSubmission> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        match self.deadline {
            Some(deadline) if now >= deadline => {
                Some(self.finalize(now, SubmissionTrigger::TimerExpired))
            }
            _ => None,
        }
    }

    /// The store acknowledged the submission.
    pub fn mark_stored(&mut self) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Submitting {
            return Err(SessionError::WrongPhase(self.phase));
        }
        self.phase = SessionPhase::Complete;
        Ok(())
    }

    fn finalize(&mut self, now: DateTime<Utc>, trigger: SubmissionTrigger) -> FinalizedSubmission {
        let mut answers = Vec::with_capacity(self.questions.len());
        let mut correct = 0;

        for question in &self.questions {
            let draft = self.drafts.get(&question.id);
            let is_correct = draft.is_some_and(|d| {
                question.correct_option.as_deref() == Some(d.selected_option.as_str())
            });
            if is_correct {
                correct += 1;
            }

            let (selected_option, timestamp) = match draft {
                Some(d) => (d.selected_option.clone(), Some(d.timestamp)),
                None => (NOT_ANSWERED.to_string(), Some(now)),
            };

            answers.push(AnswerRecord {
                question_id: question.id.clone(),
                question_text: question.text.clone(),
                selected_option,
                correct_option: question.correct_option.clone(),
                is_correct,
                timestamp,
                topic: question
                    .topic
                    .clone()
                    .unwrap_or_else(|| UNTAGGED_TOPIC.to_string()),
                kind: question
                    .kind
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                difficulty: question
                    .difficulty
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            });
        }

        self.phase = SessionPhase::Submitting;

        let total = answers.len();
        FinalizedSubmission {
            session_id: self.config.session_id.clone(),
            answers,
            correct_answers: correct,
            total_questions: total,
            score_percentage: score_percentage(correct, total),
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Level;

    fn question(id: &str, answer: &str) -> Question {
        Question {
            id: id.to_string(),
            text: format!("Question {id}"),
            options: vec!["A".into(), "B".into(), answer.to_string()],
            correct_option: Some(answer.to_string()),
            topic: None,
            kind: None,
            difficulty: None,
        }
    }

    fn in_progress_session(questions: Vec<Question>) -> (InterviewSession, DateTime<Utc>) {
        let config = SessionConfig::new("Algorithms", Level::Easy, questions.len() as u32, 1);
        let mut session = InterviewSession::new(config).unwrap();
        session.begin_loading().unwrap();
        let start = Utc::now();
        session.questions_ready(questions, start).unwrap();
        (session, start)
    }

    #[test]
    fn rejects_non_positive_configuration() {
        let mut config = SessionConfig::new("Java", Level::Easy, 0, 1);
        assert_eq!(
            InterviewSession::new(config.clone()).err(),
            Some(SessionError::InvalidConfig)
        );

        config.question_count = 5;
        config.timer_minutes = 0;
        assert_eq!(
            InterviewSession::new(config).err(),
            Some(SessionError::InvalidConfig)
        );
    }

    #[test]
    fn phases_advance_in_order() {
        let config = SessionConfig::new("Java", Level::Easy, 1, 1);
        let mut session = InterviewSession::new(config).unwrap();
        assert_eq!(session.phase(), SessionPhase::Configuring);

        session.begin_loading().unwrap();
        assert_eq!(session.phase(), SessionPhase::LoadingQuestions);

        let start = Utc::now();
        session.questions_ready(vec![question("1", "B")], start).unwrap();
        assert_eq!(session.phase(), SessionPhase::InProgress);

        session.submit(start).unwrap();
        assert_eq!(session.phase(), SessionPhase::Submitting);

        session.mark_stored().unwrap();
        assert_eq!(session.phase(), SessionPhase::Complete);
    }

    #[test]
    fn loading_failure_returns_to_configuring() {
        let config = SessionConfig::new("Java", Level::Easy, 1, 1);
        let mut session = InterviewSession::new(config).unwrap();
        session.begin_loading().unwrap();
        session.loading_failed().unwrap();
        assert_eq!(session.phase(), SessionPhase::Configuring);
    }

    #[test]
    fn reselection_overwrites_option_and_timestamp() {
        let (mut session, start) = in_progress_session(vec![question("1", "C")]);

        session.select_option("1", "A", start).unwrap();
        let later = start + Duration::seconds(10);
        session.select_option("1", "C", later).unwrap();

        let draft = session.answer("1").unwrap();
        assert_eq!(draft.selected_option, "C");
        assert_eq!(draft.timestamp, later);
    }

    #[test]
    fn unknown_question_is_rejected() {
        let (mut session, start) = in_progress_session(vec![question("1", "C")]);
        assert_eq!(
            session.select_option("nope", "A", start),
            Err(SessionError::UnknownQuestion("nope".into()))
        );
    }

    #[test]
    fn navigation_clamps_and_keeps_answers() {
        let (mut session, start) =
            in_progress_session(vec![question("1", "C"), question("2", "C")]);
        session.select_option("1", "C", start).unwrap();

        session.next_question();
        session.next_question();
        session.next_question();
        assert_eq!(session.current_index(), 1);

        session.previous_question();
        session.previous_question();
        assert_eq!(session.current_index(), 0);

        session.go_to(99);
        assert_eq!(session.current_index(), 1);

        assert!(session.answer("1").is_some());
    }

    #[test]
    fn unanswered_questions_are_synthesized_on_submit() {
        let (mut session, start) =
            in_progress_session(vec![question("1", "C"), question("2", "C")]);
        session.select_option("1", "C", start).unwrap();

        let submission = session.submit(start + Duration::seconds(30)).unwrap();
        assert_eq!(submission.total_questions, 2);

        let second = &submission.answers[1];
        assert_eq!(second.selected_option, NOT_ANSWERED);
        assert!(!second.is_correct);
        assert!(second.timestamp.is_some());
        assert_eq!(second.topic, UNTAGGED_TOPIC);
    }

    #[test]
    fn scoring_is_order_invariant() {
        let questions = vec![question("1", "A"), question("2", "B"), question("3", "C")];

        let (mut forward, start) = in_progress_session(questions.clone());
        forward.select_option("1", "A", start).unwrap();
        forward.select_option("2", "X", start).unwrap();
        forward.select_option("3", "C", start).unwrap();
        let forward_result = forward.submit(start).unwrap();

        let (mut backward, start) = in_progress_session(questions);
        backward.select_option("3", "C", start).unwrap();
        backward.select_option("2", "X", start).unwrap();
        backward.select_option("1", "A", start).unwrap();
        let backward_result = backward.submit(start).unwrap();

        assert_eq!(forward_result.correct_answers, 2);
        assert_eq!(
            forward_result.correct_answers,
            backward_result.correct_answers
        );
        assert_eq!(
            forward_result.score_percentage,
            backward_result.score_percentage
        );
    }

    #[test]
    fn manual_submit_then_timer_tick_finalizes_once() {
        let (mut session, start) = in_progress_session(vec![question("1", "C")]);

        let manual = session.submit(start + Duration::seconds(5));
        assert!(manual.is_some());

        // A late tick past the deadline must not produce a second set.
        let expired = session.tick(start + Duration::minutes(2));
        assert!(expired.is_none());
    }

    #[test]
    fn timer_expiry_then_manual_submit_finalizes_once() {
        let (mut session, start) = in_progress_session(vec![question("1", "C")]);

        let expired = session.tick(start + Duration::minutes(1)).unwrap();
        assert_eq!(expired.trigger, SubmissionTrigger::TimerExpired);

        assert!(session.submit(start + Duration::minutes(1)).is_none());
    }

    #[test]
    fn tick_before_deadline_does_nothing() {
        let (mut session, start) = in_progress_session(vec![question("1", "C")]);
        assert!(session.tick(start + Duration::seconds(59)).is_none());
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.remaining_seconds(start + Duration::seconds(30)), 30);
    }

    #[test]
    fn remaining_time_saturates_at_zero() {
        let (session, start) = in_progress_session(vec![question("1", "C")]);
        assert_eq!(session.remaining_seconds(start + Duration::minutes(5)), 0);
    }

    #[test]
    fn two_question_timed_run_scores_fifty_percent() {
        let config = SessionConfig::new("Algorithms", Level::Easy, 2, 1);
        let session_id = config.session_id.clone();
        let mut session = InterviewSession::new(config).unwrap();
        session.begin_loading().unwrap();

        let start = Utc::now();
        session
            .questions_ready(vec![question("1", "B"), question("2", "C")], start)
            .unwrap();

        session.select_option("1", "B", start + Duration::seconds(10)).unwrap();

        let submission = session.tick(start + Duration::minutes(1)).unwrap();
        assert_eq!(submission.session_id, session_id);
        assert_eq!(submission.correct_answers, 1);
        assert_eq!(submission.total_questions, 2);
        assert_eq!(submission.score_percentage, 50.0);
        assert_eq!(submission.trigger, SubmissionTrigger::TimerExpired);

        let document = submission.into_document(session.config().clone(), Utc::now());
        assert_eq!(document.session_id, session_id);
        assert_eq!(document.answers.len(), 2);
    }

    #[test]
    fn free_text_questions_never_score_correct() {
        let free_text = Question {
            id: "1".into(),
            text: "Describe a deadlock.".into(),
            options: Vec::new(),
            correct_option: None,
            topic: None,
            kind: None,
            difficulty: None,
        };
        let (mut session, start) = in_progress_session(vec![free_text]);
        session.select_option("1", "Two threads wait on each other", start).unwrap();

        let submission = session.submit(start).unwrap();
        assert_eq!(submission.correct_answers, 0);
        assert_eq!(submission.answers[0].selected_option, "Two threads wait on each other");
    }
}
