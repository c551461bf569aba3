// src/models/session.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    config::QuizSettings,
    quiz::{
        AssignmentConfig, AssignmentKind, GestureKind, IntegrityPolicy, IntegritySignal, QuizResult,
        SessionStatus, TerminationReason,
    },
};

/// DTO for starting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub assignment_id: String,

    #[serde(default = "default_kind")]
    pub kind: AssignmentKind,

    #[validate(range(min = 1, max = 600))]
    pub time_limit_minutes: Option<u32>,

    #[validate(range(min = 1, max = 500))]
    pub question_cap: Option<u32>,

    #[validate(range(min = 1, max = 100))]
    pub integrity_threshold: Option<u32>,

    #[validate(range(min = 1, max = 100))]
    pub gesture_threshold: Option<u32>,

    pub shuffle_questions: Option<bool>,
}

fn default_kind() -> AssignmentKind {
    AssignmentKind::Assignment
}

impl StartSessionRequest {
    /// Resolves the assignment settings, falling back to the deployment defaults.
    pub fn assignment_config(&self, settings: &QuizSettings) -> AssignmentConfig {
        let question_cap = match self.kind {
            AssignmentKind::Exam => Some(self.question_cap.unwrap_or(settings.exam_question_cap)),
            AssignmentKind::Assignment => self.question_cap,
        };

        AssignmentConfig {
            time_limit_minutes: self
                .time_limit_minutes
                .unwrap_or(settings.default_time_limit_minutes),
            question_cap,
            shuffle_questions: self.shuffle_questions.unwrap_or(true),
            integrity: IntegrityPolicy::new(
                self.integrity_threshold.unwrap_or(settings.integrity_threshold),
                self.gesture_threshold.or(settings.gesture_threshold),
            ),
        }
    }
}

/// DTO for recording an answer.
#[derive(Debug, Deserialize, Validate)]
pub struct AnswerRequest {
    #[validate(length(min = 1, max = 100))]
    pub question_id: String,
    #[validate(length(min = 1, max = 100))]
    pub option_id: String,
}

/// DTO for moving to another question.
#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub index: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    FocusLost,
    BlockedGesture,
}

/// DTO for an integrity signal reported by the browser.
#[derive(Debug, Deserialize)]
pub struct SignalRequest {
    pub kind: SignalKind,
    /// Which gesture was blocked; defaults to a context menu attempt.
    pub gesture: Option<GestureKind>,
}

impl SignalRequest {
    pub fn signal(&self) -> IntegritySignal {
        match self.kind {
            SignalKind::FocusLost => IntegritySignal::FocusLost,
            SignalKind::BlockedGesture => {
                IntegritySignal::BlockedGesture(self.gesture.unwrap_or(GestureKind::ContextMenu))
            }
        }
    }
}

/// Result payload shown on the results view.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub status: SessionStatus,
    pub reason: TerminationReason,
    pub message: &'static str,
    #[serde(flatten)]
    pub result: QuizResult,
}
