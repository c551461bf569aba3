// src/quiz/reducer.rs

use chrono::{DateTime, Utc};

use super::{
    error::QuizError,
    integrity::IntegritySignal,
    model::{Completion, QuizSession},
};

/// Everything that can change a session, from either the clock or the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Tick,
    Answer {
        question_id: String,
        option_id: String,
    },
    Navigate {
        index: usize,
    },
    Signal(IntegritySignal),
    Submit,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    pub mutated: bool,
    pub completion: Option<Completion>,
}

impl QuizSession {
    /// The single state-transition function. Callers serialize access to the session.
    ///
    /// A passed deadline is enforced before the event itself, so an answer that arrives after
    /// time ran out expires the session instead of being recorded.
    pub fn apply(&mut self, event: SessionEvent, now: DateTime<Utc>) -> Result<Transition, QuizError> {
        if let Some(completion) = self.expire_if_due(now) {
            return Ok(Transition {
                mutated: true,
                completion: Some(completion),
            });
        }

        let transition = match event {
            SessionEvent::Tick => Transition::default(),
            SessionEvent::Answer {
                question_id,
                option_id,
            } => Transition {
                mutated: self.record_answer(&question_id, &option_id),
                completion: None,
            },
            SessionEvent::Navigate { index } => Transition {
                mutated: self.navigate_to(index)?,
                completion: None,
            },
            SessionEvent::Signal(signal) => {
                let was_open = self.is_in_progress();
                let outcome = self.observe_signal(signal, now);
                Transition {
                    mutated: was_open,
                    completion: outcome.completion,
                }
            }
            SessionEvent::Submit => {
                let completion = self.submit(now);
                Transition {
                    mutated: completion.is_some(),
                    completion,
                }
            }
        };

        Ok(transition)
    }
}
