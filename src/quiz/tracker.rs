// src/quiz/tracker.rs

use super::{error::QuizError, model::QuizSession};

impl QuizSession {
    /// Records the learner's choice for a question, replacing any earlier choice.
    ///
    /// Unknown question or option ids and closed sessions are ignored: UI replays and
    /// double clicks are expected. Returns whether the session changed.
    pub fn record_answer(&mut self, question_id: &str, option_id: &str) -> bool {
        if !self.is_in_progress() {
            return false;
        }

        let Some(question) = self.question(question_id) else {
            tracing::debug!(session_id = %self.id, question_id, "Ignoring answer for unknown question");
            return false;
        };
        if !question.has_option(option_id) {
            tracing::debug!(session_id = %self.id, question_id, option_id, "Ignoring unknown option");
            return false;
        }

        let previous = self
            .answers
            .insert(question_id.to_string(), option_id.to_string());
        previous.as_deref() != Some(option_id)
    }

    /// Moves to the question at `index`.
    ///
    /// Out-of-range indices are a caller bug and are rejected. A closed session is left as is.
    pub fn navigate_to(&mut self, index: usize) -> Result<bool, QuizError> {
        if index >= self.questions.len() {
            tracing::debug!(session_id = %self.id, index, "Rejected navigation");
            return Err(QuizError::InvalidQuestionReference(format!(
                "question index {} is out of range (0..{})",
                index,
                self.questions.len()
            )));
        }
        if !self.is_in_progress() || self.current_question_index == index {
            return Ok(false);
        }

        self.current_question_index = index;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rand::{SeedableRng, rngs::StdRng};

    use crate::quiz::{
        builder::{create_session, tests::assignment},
        model::{AssignmentConfig, QuizSession, SessionStatus},
    };

    use super::*;

    fn session() -> QuizSession {
        let mut rng = StdRng::seed_from_u64(11);
        create_session("learner", &assignment(3, AssignmentConfig::new(10)), Utc::now(), &mut rng)
            .unwrap()
    }

    #[test]
    fn test_second_answer_overwrites_first() {
        let mut session = session();

        assert!(session.record_answer("q1", "a"));
        assert!(session.record_answer("q1", "c"));

        assert_eq!(session.answers.get("q1").map(String::as_str), Some("c"));
        assert_eq!(session.answers.len(), 1);
    }

    #[test]
    fn test_answers_count_distinct_questions() {
        let mut session = session();

        session.record_answer("q1", "a");
        session.record_answer("q2", "b");
        session.record_answer("q1", "d");
        session.record_answer("q2", "b");

        assert_eq!(session.answered_count(), 2);
    }

    #[test]
    fn test_unknown_question_is_ignored() {
        let mut session = session();

        assert!(!session.record_answer("q99", "a"));
        assert!(!session.record_answer("q1", "z"));
        assert!(session.answers.is_empty());
    }

    #[test]
    fn test_closed_session_ignores_answers() {
        let mut session = session();
        session.status = SessionStatus::Submitted;

        assert!(!session.record_answer("q1", "a"));
        assert!(session.answers.is_empty());
    }

    #[test]
    fn test_navigation_within_range() {
        let mut session = session();

        assert_eq!(session.navigate_to(2), Ok(true));
        assert_eq!(session.current_question_index, 2);
        assert_eq!(session.navigate_to(2), Ok(false));
    }

    #[test]
    fn test_navigation_out_of_range_is_rejected() {
        let mut session = session();

        let err = session.navigate_to(3).unwrap_err();
        assert!(matches!(err, QuizError::InvalidQuestionReference(_)));
        assert_eq!(session.current_question_index, 0);
    }

    #[test]
    fn test_navigation_keeps_answers() {
        let mut session = session();
        session.record_answer("q1", "b");

        session.navigate_to(1).unwrap();
        session.navigate_to(0).unwrap();

        assert_eq!(session.answers.get("q1").map(String::as_str), Some("b"));
    }
}
