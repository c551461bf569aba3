// src/quiz/builder.rs

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use uuid::Uuid;

use super::{
    error::QuizError,
    model::{Assignment, QuestionDefinition, QuizSession, SessionQuestion, SessionStatus},
};

/// Source of uniform random indices for shuffling.
///
/// Every `rand::Rng` is a `RandomSource`; tests pass a seeded `StdRng` or a `StepRng`.
pub trait RandomSource {
    /// Returns a uniformly distributed index in `0..=upper`.
    fn pick_up_to(&mut self, upper: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn pick_up_to(&mut self, upper: usize) -> usize {
        self.gen_range(0..=upper)
    }
}

/// Fisher-Yates: walk from the last index down to 1, swapping with an index in `0..=i`.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.pick_up_to(i);
        items.swap(i, j);
    }
}

/// Builds a fresh, randomized `QuizSession` from an assignment.
pub struct SessionBuilder<'a> {
    assignment: &'a Assignment,
    attempt_group_id: Option<Uuid>,
    attempt_number: u32,
}

impl<'a> SessionBuilder<'a> {
    pub fn new(assignment: &'a Assignment) -> Self {
        Self {
            assignment,
            attempt_group_id: None,
            attempt_number: 1,
        }
    }

    /// Links the new session to a previous attempt of the same assignment.
    pub fn follow_up(mut self, previous: &QuizSession) -> Self {
        self.attempt_group_id = Some(previous.attempt_group_id);
        self.attempt_number = previous.attempt_number + 1;
        self
    }

    pub fn build<R: RandomSource + ?Sized>(
        self,
        owner_id: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<QuizSession, QuizError> {
        let assignment = self.assignment;
        let config = &assignment.config;

        if assignment.questions.is_empty() {
            return Err(QuizError::NoQuestionsAvailable {
                assignment_id: assignment.id.clone(),
            });
        }
        if config.time_limit_minutes == 0 {
            return Err(QuizError::InvalidConfig(
                "time limit must be at least one minute".to_string(),
            ));
        }
        if config.question_cap == Some(0) {
            return Err(QuizError::InvalidConfig(
                "question cap must be positive".to_string(),
            ));
        }

        let drawn = draw_questions(&assignment.questions, config.question_cap, config.shuffle_questions, rng);

        let questions: Vec<SessionQuestion> = drawn
            .into_iter()
            .map(|definition| permute_options(definition, rng))
            .collect();

        let session = QuizSession {
            id: Uuid::new_v4(),
            owner_id: owner_id.to_string(),
            assignment_id: assignment.id.clone(),
            attempt_group_id: self.attempt_group_id.unwrap_or_else(Uuid::new_v4),
            attempt_number: self.attempt_number,
            config: config.clone(),
            questions,
            answers: HashMap::new(),
            current_question_index: 0,
            created_at: now,
            deadline: now + TimeDelta::seconds(config.time_limit_seconds()),
            status: SessionStatus::InProgress,
            warning_count: 0,
            blocked_gesture_count: 0,
            termination: None,
            result: None,
        };

        tracing::info!(
            session_id = %session.id,
            assignment_id = %session.assignment_id,
            attempt = session.attempt_number,
            questions = session.questions.len(),
            "Quiz session created"
        );

        Ok(session)
    }
}

/// Starts a first attempt at `assignment`.
pub fn create_session<R: RandomSource + ?Sized>(
    owner_id: &str,
    assignment: &Assignment,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<QuizSession, QuizError> {
    SessionBuilder::new(assignment).build(owner_id, now, rng)
}

/// Picks the questions for one attempt.
///
/// With a cap, `min(cap, bank)` questions are drawn uniformly without replacement.
/// Without shuffling, the drawn questions keep their bank order.
fn draw_questions<'q, R: RandomSource + ?Sized>(
    bank: &'q [QuestionDefinition],
    cap: Option<u32>,
    shuffle_order: bool,
    rng: &mut R,
) -> Vec<&'q QuestionDefinition> {
    let mut indices: Vec<usize> = (0..bank.len()).collect();
    let take = cap
        .map(|c| (c as usize).min(bank.len()))
        .unwrap_or(bank.len());

    if take < bank.len() || shuffle_order {
        shuffle(&mut indices, rng);
    }
    indices.truncate(take);
    if !shuffle_order {
        indices.sort_unstable();
    }

    indices.into_iter().map(|i| &bank[i]).collect()
}

fn permute_options<R: RandomSource + ?Sized>(
    definition: &QuestionDefinition,
    rng: &mut R,
) -> SessionQuestion {
    let mut options = definition.options.clone();
    shuffle(&mut options, rng);

    SessionQuestion {
        question_id: definition.id.clone(),
        prompt: definition.prompt.clone(),
        prompt_kind: definition.prompt_kind,
        options,
        original_correct_option_id: definition.correct_option_id.clone(),
        explanation: definition.explanation.clone(),
    }
}
