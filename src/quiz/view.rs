// src/quiz/view.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    clock::TimeStatus,
    model::{PromptKind, QuizOption, QuizSession, SessionStatus, TerminationReason},
};

/// A question as sent to the learner (excludes the correct answer and explanation).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub prompt_kind: PromptKind,
    pub options: Vec<QuizOption>,
    pub selected_option_id: Option<String>,
}

/// Read-only projection of a session for rendering.
///
/// Derived only from the session and the clock; there is no other source of truth.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub assignment_id: String,
    pub attempt_group_id: Uuid,
    pub attempt_number: u32,
    pub status: SessionStatus,
    pub termination_reason: Option<TerminationReason>,
    pub message: Option<&'static str>,
    pub current_index: usize,
    pub total_questions: usize,
    pub current_question: Option<PublicQuestion>,
    pub remaining_seconds: i64,
    pub answered_count: usize,
    pub is_nearing_expiry: bool,
    pub warning_count: u32,
    pub blocked_gesture_count: u32,
    pub deadline: DateTime<Utc>,
}

impl QuizSession {
    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        let current_question = self.current_question().map(|q| PublicQuestion {
            id: q.question_id.clone(),
            prompt: q.prompt.clone(),
            prompt_kind: q.prompt_kind,
            options: q.options.clone(),
            selected_option_id: self.answers.get(&q.question_id).cloned(),
        });

        let running = self.is_in_progress();

        SessionView {
            session_id: self.id,
            assignment_id: self.assignment_id.clone(),
            attempt_group_id: self.attempt_group_id,
            attempt_number: self.attempt_number,
            status: self.status,
            termination_reason: self.termination,
            message: self.termination.map(|r| r.message()),
            current_index: self.current_question_index,
            total_questions: self.questions.len(),
            current_question,
            remaining_seconds: if running { self.remaining_seconds(now) } else { 0 },
            answered_count: self.answered_count(),
            is_nearing_expiry: running && self.time_status(now) == TimeStatus::NearingExpiry,
            warning_count: self.warning_count,
            blocked_gesture_count: self.blocked_gesture_count,
            deadline: self.deadline,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rand::{SeedableRng, rngs::StdRng};

    use crate::quiz::{
        builder::{create_session, tests::assignment},
        model::AssignmentConfig,
    };

    #[test]
    fn test_view_tracks_progress() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = create_session(
            "learner",
            &assignment(3, AssignmentConfig::new(10)),
            chrono::Utc::now(),
            &mut rng,
        )
        .unwrap();
        let current = session.questions[0].question_id.clone();
        session.record_answer(&current, "b");

        let view = session.view(session.created_at + TimeDelta::seconds(320));

        assert_eq!(view.total_questions, 3);
        assert_eq!(view.answered_count, 1);
        assert_eq!(view.remaining_seconds, 280);
        assert!(view.is_nearing_expiry);
        let question = view.current_question.unwrap();
        assert_eq!(question.id, current);
        assert_eq!(question.selected_option_id.as_deref(), Some("b"));
    }

    #[test]
    fn test_view_of_finished_session() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut session = create_session(
            "learner",
            &assignment(1, AssignmentConfig::new(10)),
            chrono::Utc::now(),
            &mut rng,
        )
        .unwrap();
        session.submit(session.created_at);

        let view = session.view(session.created_at + TimeDelta::seconds(590));

        assert_eq!(view.remaining_seconds, 0);
        assert!(!view.is_nearing_expiry);
        assert_eq!(view.message, Some("Quiz submitted"));
    }
}
