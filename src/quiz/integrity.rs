// src/quiz/integrity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_INTEGRITY_THRESHOLD;

use super::model::{Completion, QuizSession, SessionStatus, TerminationReason};

/// Input gestures the UI blocks during a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Copy,
    ContextMenu,
    DevTools,
}

/// Environment events reported by the UI layer.
///
/// These are deterrents only: everything here is observable and suppressible by the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegritySignal {
    FocusLost,
    BlockedGesture(GestureKind),
}

/// Thresholds at which integrity signals force-terminate a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityPolicy {
    pub focus_loss_limit: u32,
    /// `None` means blocked gestures are only reported.
    pub gesture_limit: Option<u32>,
}

impl IntegrityPolicy {
    pub fn new(focus_loss_limit: u32, gesture_limit: Option<u32>) -> Self {
        Self {
            focus_loss_limit,
            gesture_limit,
        }
    }
}

impl Default for IntegrityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_INTEGRITY_THRESHOLD, None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalOutcome {
    pub warning_count: u32,
    pub blocked_gesture_count: u32,
    /// Set only when this signal crossed a threshold and ended the session.
    pub completion: Option<Completion>,
}

impl QuizSession {
    /// Applies one integrity signal. Signals on a closed session are ignored.
    pub fn observe_signal(&mut self, signal: IntegritySignal, now: DateTime<Utc>) -> SignalOutcome {
        let completion = if self.is_in_progress() {
            self.count_signal(signal, now)
        } else {
            None
        };

        SignalOutcome {
            warning_count: self.warning_count,
            blocked_gesture_count: self.blocked_gesture_count,
            completion,
        }
    }

    fn count_signal(&mut self, signal: IntegritySignal, now: DateTime<Utc>) -> Option<Completion> {
        let policy = self.config.integrity;

        let limit_reached = match signal {
            IntegritySignal::FocusLost => {
                self.warning_count += 1;
                tracing::warn!(
                    session_id = %self.id,
                    warnings = self.warning_count,
                    limit = policy.focus_loss_limit,
                    "Learner left the quiz window"
                );
                self.warning_count >= policy.focus_loss_limit
            }
            IntegritySignal::BlockedGesture(kind) => {
                self.blocked_gesture_count += 1;
                tracing::debug!(
                    session_id = %self.id,
                    gesture = ?kind,
                    count = self.blocked_gesture_count,
                    "Blocked gesture"
                );
                policy
                    .gesture_limit
                    .is_some_and(|limit| self.blocked_gesture_count >= limit)
            }
        };

        if limit_reached {
            self.finish(
                SessionStatus::Expired,
                TerminationReason::IntegrityViolation,
                now,
            )
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::quiz::{
        builder::{create_session, tests::assignment},
        model::AssignmentConfig,
    };

    fn session(policy: IntegrityPolicy) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(2);
        create_session(
            "learner",
            &assignment(3, AssignmentConfig::new(10).with_integrity(policy)),
            Utc::now(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_two_focus_losses_only_warn() {
        let mut session = session(IntegrityPolicy::default());
        let now = session.created_at;

        session.observe_signal(IntegritySignal::FocusLost, now);
        let outcome = session.observe_signal(IntegritySignal::FocusLost, now);

        assert_eq!(outcome.warning_count, 2);
        assert!(outcome.completion.is_none());
        assert_eq!(session.status, SessionStatus::InProgress);
    }

    #[test]
    fn test_third_focus_loss_terminates() {
        let mut session = session(IntegrityPolicy::default());
        let now = session.created_at;

        session.observe_signal(IntegritySignal::FocusLost, now);
        session.observe_signal(IntegritySignal::FocusLost, now);
        let outcome = session.observe_signal(IntegritySignal::FocusLost, now);

        let completion = outcome.completion.expect("threshold reached");
        assert_eq!(completion.status, SessionStatus::Expired);
        assert_eq!(completion.reason, TerminationReason::IntegrityViolation);
        assert_eq!(session.status, SessionStatus::Expired);
    }

    #[test]
    fn test_signals_after_termination_are_ignored() {
        let mut session = session(IntegrityPolicy::new(1, None));
        let now = session.created_at;

        assert!(session.observe_signal(IntegritySignal::FocusLost, now).completion.is_some());
        let outcome = session.observe_signal(IntegritySignal::FocusLost, now);

        assert!(outcome.completion.is_none());
        assert_eq!(outcome.warning_count, 1);
    }

    #[test]
    fn test_blocked_gestures_are_counted_separately() {
        let mut session = session(IntegrityPolicy::default());
        let now = session.created_at;

        for _ in 0..10 {
            session.observe_signal(IntegritySignal::BlockedGesture(GestureKind::Copy), now);
        }

        assert_eq!(session.blocked_gesture_count, 10);
        assert_eq!(session.warning_count, 0);
        assert_eq!(session.status, SessionStatus::InProgress);
    }

    #[test]
    fn test_gesture_limit_can_terminate() {
        let mut session = session(IntegrityPolicy::new(3, Some(2)));
        let now = session.created_at;

        session.observe_signal(IntegritySignal::BlockedGesture(GestureKind::DevTools), now);
        let outcome =
            session.observe_signal(IntegritySignal::BlockedGesture(GestureKind::ContextMenu), now);

        assert_eq!(
            outcome.completion.map(|c| c.reason),
            Some(TerminationReason::IntegrityViolation)
        );
    }
}
