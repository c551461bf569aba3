// src/quiz/grader.rs

use chrono::{DateTime, Utc};

use super::model::{
    Completion, QuestionOutcome, QuizResult, QuizSession, SessionStatus, TerminationReason,
    Verdict,
};

/// Percentage of correct answers, rounded half-up to one decimal.
/// An empty quiz scores 0.
pub fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    // Integer tenths, so exact .x5 ties round up regardless of float representation.
    let (correct, total) = (u64::from(correct), u64::from(total));
    let tenths = (correct * 2000 + total) / (2 * total);
    tenths as f64 / 10.0
}

impl QuizSession {
    /// Scores the current answers without touching the session.
    ///
    /// Answers are compared against the original correct option id, never a display position.
    pub fn compute_result(&self, now: DateTime<Utc>) -> QuizResult {
        let mut correct_count = 0;
        let mut incorrect_count = 0;
        let mut unanswered_count = 0;

        let per_question: Vec<QuestionOutcome> = self
            .questions
            .iter()
            .map(|question| {
                let status = match self.answers.get(&question.question_id) {
                    None => {
                        unanswered_count += 1;
                        Verdict::Unanswered
                    }
                    Some(chosen) if *chosen == question.original_correct_option_id => {
                        correct_count += 1;
                        Verdict::Correct
                    }
                    Some(_) => {
                        incorrect_count += 1;
                        Verdict::Incorrect
                    }
                };
                QuestionOutcome {
                    question_id: question.question_id.clone(),
                    status,
                }
            })
            .collect();

        let total_questions = per_question.len() as u32;
        // A late tick must not report more time than was allotted.
        let elapsed = (now - self.created_at).num_seconds().max(0);
        let time_spent_seconds = elapsed.min(self.config.time_limit_seconds());

        QuizResult {
            session_id: self.id,
            per_question,
            correct_count,
            incorrect_count,
            unanswered_count,
            total_questions,
            percentage: percentage(correct_count, total_questions),
            time_spent_seconds,
            graded_at: now,
        }
    }

    /// Grades the session once and caches the result; later calls return the cached value.
    pub fn grade(&mut self, now: DateTime<Utc>) -> QuizResult {
        if let Some(result) = &self.result {
            return result.clone();
        }
        let result = self.compute_result(now);
        self.result = Some(result.clone());
        result
    }

    /// Moves an in-progress session to `status` and grades it.
    ///
    /// Returns `None` when the session already left `in_progress`: the first trigger wins.
    pub(crate) fn finish(
        &mut self,
        status: SessionStatus,
        reason: TerminationReason,
        now: DateTime<Utc>,
    ) -> Option<Completion> {
        if !self.is_in_progress() {
            return None;
        }

        self.status = status;
        self.termination = Some(reason);
        let result = self.grade(now);

        tracing::info!(
            session_id = %self.id,
            status = status.as_str(),
            reason = reason.as_str(),
            correct = result.correct_count,
            total = result.total_questions,
            "Quiz session finished"
        );

        Some(Completion {
            status,
            reason,
            result,
        })
    }

    /// Learner-initiated submission. If the deadline already passed, the session expires instead.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<Completion> {
        if let Some(completion) = self.expire_if_due(now) {
            return Some(completion);
        }
        self.finish(SessionStatus::Submitted, TerminationReason::Submitted, now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::quiz::{
        builder::{create_session, tests::assignment},
        model::AssignmentConfig,
    };

    fn session(count: usize, minutes: u32) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(5);
        create_session(
            "learner",
            &assignment(count, AssignmentConfig::new(minutes)),
            Utc::now(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(2, 4), 50.0);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(1, 8), 12.5);
        assert_eq!(percentage(1, 16), 6.3);
        assert_eq!(percentage(23, 80), 28.8);
        assert_eq!(percentage(41, 80), 51.3);
        assert_eq!(percentage(51, 80), 63.8);
        assert_eq!(percentage(80, 80), 100.0);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_counts_always_add_up() {
        let mut session = session(6, 10);
        session.record_answer("q1", "a");
        session.record_answer("q2", "b");
        session.record_answer("q5", "a");

        let result = session.compute_result(session.created_at);

        assert_eq!(result.correct_count, 2);
        assert_eq!(result.incorrect_count, 1);
        assert_eq!(result.unanswered_count, 3);
        assert_eq!(
            result.correct_count + result.incorrect_count + result.unanswered_count,
            result.total_questions
        );
        assert_eq!(result.per_question.len(), 6);
    }

    #[test]
    fn test_time_spent_is_capped_at_limit() {
        let session = session(2, 1);
        let late = session.deadline + TimeDelta::seconds(10);

        let result = session.compute_result(late);
        assert_eq!(result.time_spent_seconds, 60);
    }

    #[test]
    fn test_time_spent_before_deadline() {
        let session = session(2, 1);

        let result = session.compute_result(session.created_at + TimeDelta::seconds(42));
        assert_eq!(result.time_spent_seconds, 42);
    }

    #[test]
    fn test_grade_returns_cached_result() {
        let mut session = session(2, 5);
        session.record_answer("q1", "a");
        let first = session.grade(session.created_at + TimeDelta::seconds(30));

        session.answers.clear();
        let second = session.grade(session.created_at + TimeDelta::seconds(90));

        assert_eq!(first, second);
        assert_eq!(second.correct_count, 1);
    }

    #[test]
    fn test_submit_once() {
        let mut session = session(2, 5);
        let now = session.created_at + TimeDelta::seconds(20);

        let completion = session.submit(now).expect("first submit completes");
        assert_eq!(completion.status, SessionStatus::Submitted);
        assert_eq!(completion.reason, TerminationReason::Submitted);

        assert!(session.submit(now).is_none());
        assert_eq!(session.status, SessionStatus::Submitted);
    }

    #[test]
    fn test_submit_after_deadline_expires() {
        let mut session = session(2, 1);
        let late = session.deadline + TimeDelta::seconds(1);

        let completion = session.submit(late).unwrap();
        assert_eq!(completion.status, SessionStatus::Expired);
        assert_eq!(completion.reason, TerminationReason::TimeExpired);
    }
}
