// src/quiz/error.rs

use thiserror::Error;

/// Errors raised by the quiz engine.
///
/// Grading an already graded session is not an error: the cached result is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("no questions available for assignment '{assignment_id}'")]
    NoQuestionsAvailable { assignment_id: String },

    #[error("invalid question reference: {0}")]
    InvalidQuestionReference(String),

    #[error("invalid assignment configuration: {0}")]
    InvalidConfig(String),

    /// The session was abandoned; its timer is stopped and it accepts no more events.
    #[error("session has been discarded")]
    SessionDiscarded,
}
