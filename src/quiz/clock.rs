// src/quiz/clock.rs

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use super::model::{Completion, QuizSession, SessionStatus, TerminationReason};

/// Remaining time at or below which the UI shows the "nearing expiry" warning.
pub const NEARING_EXPIRY_SECONDS: i64 = 300;

/// Wall clock used by live sessions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += TimeDelta::seconds(seconds);
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Observational time signal for the UI. Never mutates the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStatus {
    Normal,
    NearingExpiry,
    Expired,
}

impl TimeStatus {
    pub fn from_remaining(remaining_seconds: i64) -> Self {
        if remaining_seconds <= 0 {
            TimeStatus::Expired
        } else if remaining_seconds <= NEARING_EXPIRY_SECONDS {
            TimeStatus::NearingExpiry
        } else {
            TimeStatus::Normal
        }
    }
}

/// What one clock tick observed.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub remaining_seconds: i64,
    pub time_status: TimeStatus,
    /// Set only on the tick that expired the session.
    pub completion: Option<Completion>,
}

impl TickOutcome {
    /// The ticker can stop once the session is no longer running.
    pub fn should_stop(&self, status: SessionStatus) -> bool {
        self.completion.is_some() || status.is_terminal()
    }
}

impl QuizSession {
    /// Seconds until the deadline, never negative.
    ///
    /// Derived from the absolute deadline so pausing the ticker loses nothing.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    pub fn time_status(&self, now: DateTime<Utc>) -> TimeStatus {
        TimeStatus::from_remaining((self.deadline - now).num_seconds())
    }

    /// Expires the session if the deadline has passed and it is still running.
    pub(crate) fn expire_if_due(&mut self, now: DateTime<Utc>) -> Option<Completion> {
        if now < self.deadline {
            return None;
        }
        self.finish(SessionStatus::Expired, TerminationReason::TimeExpired, now)
    }

    /// Clock monitor step. Repeated ticks after expiry are no-ops.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let completion = self.expire_if_due(now);
        TickOutcome {
            remaining_seconds: self.remaining_seconds(now),
            time_status: self.time_status(now),
            completion,
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

    fn session(minutes: u32) -> QuizSession {
        let mut rng = StdRng::seed_from_u64(21);
        create_session(
            "learner",
            &assignment(2, AssignmentConfig::new(minutes)),
            Utc::now(),
            &mut rng,
        )
        .unwrap()
    }

    #[test]
    fn test_time_status_thresholds() {
        assert_eq!(TimeStatus::from_remaining(301), TimeStatus::Normal);
        assert_eq!(TimeStatus::from_remaining(300), TimeStatus::NearingExpiry);
        assert_eq!(TimeStatus::from_remaining(1), TimeStatus::NearingExpiry);
        assert_eq!(TimeStatus::from_remaining(0), TimeStatus::Expired);
        assert_eq!(TimeStatus::from_remaining(-5), TimeStatus::Expired);
    }

    #[test]
    fn test_tick_before_deadline_changes_nothing() {
        let mut session = session(10);
        let before = session.clone();

        let outcome = session.tick(session.created_at + TimeDelta::seconds(301));

        assert_eq!(outcome.remaining_seconds, 299);
        assert_eq!(outcome.time_status, TimeStatus::NearingExpiry);
        assert!(outcome.completion.is_none());
        assert_eq!(session, before);
    }

    #[test]
    fn test_expiry_happens_exactly_once() {
        let mut session = session(1);
        let mut completions = 0;

        for extra in 0..5 {
            let outcome = session.tick(session.deadline + TimeDelta::seconds(extra));
            if outcome.completion.is_some() {
                completions += 1;
            }
            assert_eq!(outcome.remaining_seconds, 0);
            assert!(outcome.should_stop(session.status));
        }

        assert_eq!(completions, 1);
        assert_eq!(session.status, SessionStatus::Expired);
        assert_eq!(session.termination, Some(TerminationReason::TimeExpired));
        assert!(session.result.is_some());
    }

    #[test]
    fn test_tick_after_submit_does_not_expire() {
        let mut session = session(1);
        session.submit(session.created_at + TimeDelta::seconds(5));

        let outcome = session.tick(session.deadline + TimeDelta::seconds(5));

        assert!(outcome.completion.is_none());
        assert_eq!(session.status, SessionStatus::Submitted);
    }

    #[test]
    fn test_remaining_time_survives_a_pause() {
        let session = session(10);
        // Nothing ticks for four minutes; the deadline is absolute.
        let resumed_at = session.created_at + TimeDelta::seconds(240);

        assert_eq!(session.remaining_seconds(resumed_at), 360);
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);

        clock.advance(90);
        assert_eq!(clock.now(), start + TimeDelta::seconds(90));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
