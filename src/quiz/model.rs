// src/quiz/model.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{DEFAULT_TIME_LIMIT_MINUTES, EXAM_QUESTION_COUNT};

use super::integrity::IntegrityPolicy;

/// How a question prompt should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Text,
    /// `prompt` holds a reference to an image asset.
    Image,
}

impl PromptKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Text => "text",
            PromptKind::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
}

/// A question as supplied by the question bank.
///
/// `correct_option_id` must match exactly one entry of `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: String,
    pub prompt: String,
    pub prompt_kind: PromptKind,
    pub options: Vec<QuizOption>,
    pub correct_option_id: String,
    pub explanation: Option<String>,
}

/// A question as it appears in one attempt.
///
/// `options` is stored in display order. The correct answer is kept as an option id,
/// never as a position, so grading is unaffected by the permutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub question_id: String,
    pub prompt: String,
    pub prompt_kind: PromptKind,
    pub options: Vec<QuizOption>,
    pub original_correct_option_id: String,
    pub explanation: Option<String>,
}

impl SessionQuestion {
    /// Option ids in the order shown to the learner.
    pub fn display_order(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.id.as_str()).collect()
    }

    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Submitted,
    Expired,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Submitted => "submitted",
            SessionStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }
}

/// Why a session left `in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    Submitted,
    TimeExpired,
    IntegrityViolation,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::Submitted => "submitted",
            TerminationReason::TimeExpired => "time_expired",
            TerminationReason::IntegrityViolation => "integrity_violation",
        }
    }

    /// Text shown to the learner on the results view.
    pub fn message(&self) -> &'static str {
        match self {
            TerminationReason::Submitted => "Quiz submitted",
            TerminationReason::TimeExpired => "Time's up",
            TerminationReason::IntegrityViolation => "Terminated for policy violation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub status: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub session_id: Uuid,
    pub per_question: Vec<QuestionOutcome>,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub unanswered_count: u32,
    pub total_questions: u32,
    /// Rounded half-up to one decimal.
    pub percentage: f64,
    pub time_spent_seconds: i64,
    pub graded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    /// Uses the whole bank.
    Assignment,
    /// Draws at most `question_cap` questions.
    Exam,
}

/// Per-assignment settings fixed when a session is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentConfig {
    pub time_limit_minutes: u32,
    pub question_cap: Option<u32>,
    pub shuffle_questions: bool,
    pub integrity: IntegrityPolicy,
}

impl AssignmentConfig {
    pub fn new(time_limit_minutes: u32) -> Self {
        Self {
            time_limit_minutes,
            question_cap: None,
            shuffle_questions: true,
            integrity: IntegrityPolicy::default(),
        }
    }

    /// Exam mode: capped at `EXAM_QUESTION_COUNT` questions.
    pub fn exam(time_limit_minutes: u32) -> Self {
        Self {
            question_cap: Some(EXAM_QUESTION_COUNT),
            ..Self::new(time_limit_minutes)
        }
    }

    pub fn with_cap(mut self, cap: u32) -> Self {
        self.question_cap = Some(cap);
        self
    }

    pub fn with_integrity(mut self, integrity: IntegrityPolicy) -> Self {
        self.integrity = integrity;
        self
    }

    pub fn time_limit_seconds(&self) -> i64 {
        i64::from(self.time_limit_minutes) * 60
    }
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT_MINUTES)
    }
}

/// A timed quiz configuration together with the bank questions it draws from.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub id: String,
    pub questions: Vec<QuestionDefinition>,
    pub config: AssignmentConfig,
}

/// One learner's attempt. Mutable only while `status` is `InProgress`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSession {
    pub id: Uuid,
    pub owner_id: String,
    pub assignment_id: String,
    pub attempt_group_id: Uuid,
    pub attempt_number: u32,
    pub config: AssignmentConfig,
    pub questions: Vec<SessionQuestion>,
    pub answers: HashMap<String, String>,
    pub current_question_index: usize,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub status: SessionStatus,
    pub warning_count: u32,
    pub blocked_gesture_count: u32,
    pub termination: Option<TerminationReason>,
    pub result: Option<QuizResult>,
}

impl QuizSession {
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    pub fn question(&self, question_id: &str) -> Option<&SessionQuestion> {
        self.questions.iter().find(|q| q.question_id == question_id)
    }

    pub fn current_question(&self) -> Option<&SessionQuestion> {
        self.questions.get(self.current_question_index)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }
}

/// Emitted exactly once, on the transition out of `in_progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub status: SessionStatus,
    pub reason: TerminationReason,
    pub result: QuizResult,
}
