// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

use crate::quiz::{Completion, QuizResult, QuizSession};

/// Represents the 'quiz_results' table in the database.
/// One row per graded session.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub session_id: Uuid,
    pub owner_id: String,
    pub assignment_id: String,
    /// Shared by all attempts started from one another via restart.
    pub attempt_group_id: Uuid,
    pub attempt_number: i32,
    /// 'submitted' or 'expired'.
    pub status: String,
    pub reason: String,
    pub result: Json<QuizResult>,
    pub completed_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn from_completion(session: &QuizSession, completion: &Completion) -> Self {
        Self {
            session_id: session.id,
            owner_id: session.owner_id.clone(),
            assignment_id: session.assignment_id.clone(),
            attempt_group_id: session.attempt_group_id,
            attempt_number: session.attempt_number as i32,
            status: completion.status.as_str().to_string(),
            reason: completion.reason.as_str().to_string(),
            result: Json(completion.result.clone()),
            completed_at: completion.result.graded_at,
        }
    }
}
