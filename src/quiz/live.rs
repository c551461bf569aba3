// src/quiz/live.rs

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use uuid::Uuid;

use super::{
    clock::Clock,
    error::QuizError,
    model::{Completion, QuizSession},
    reducer::{SessionEvent, Transition},
    view::SessionView,
};

/// Callbacks fired by a live session.
///
/// They run while the session lock is held, in mutation order, so they must not block
/// and must not call back into the session.
pub trait SessionHooks: Send + Sync {
    /// After every mutation, with the new state.
    fn on_snapshot(&self, _session: &QuizSession) {}

    /// Exactly once per session, when it leaves `in_progress`.
    fn on_complete(&self, session: &QuizSession, completion: &Completion);

    /// When a running session is abandoned. No result exists for it.
    fn on_discard(&self, _session_id: Uuid) {}
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SessionHooks for NoHooks {
    fn on_complete(&self, _session: &QuizSession, _completion: &Completion) {}
}

struct Slot {
    session: QuizSession,
    discarded_at: Option<DateTime<Utc>>,
}

/// A session being taken right now: one mutex serializes the ticker and learner events.
pub struct LiveSession {
    id: Uuid,
    slot: Mutex<Slot>,
    clock: Arc<dyn Clock>,
    hooks: Arc<dyn SessionHooks>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl LiveSession {
    pub fn new(session: QuizSession, clock: Arc<dyn Clock>, hooks: Arc<dyn SessionHooks>) -> Arc<Self> {
        hooks.on_snapshot(&session);
        Arc::new(Self {
            id: session.id,
            slot: Mutex::new(Slot {
                session,
                discarded_at: None,
            }),
            clock,
            hooks,
            ticker: Mutex::new(None),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> QuizSession {
        self.slot().session.clone()
    }

    pub fn owner_id(&self) -> String {
        self.slot().session.owner_id.clone()
    }

    pub fn is_finished(&self) -> bool {
        let slot = self.slot();
        slot.discarded_at.is_some() || slot.session.status.is_terminal()
    }

    pub fn is_discarded(&self) -> bool {
        self.slot().discarded_at.is_some()
    }

    /// When the session stopped: grading time, or the moment it was abandoned.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        let slot = self.slot();
        slot.discarded_at
            .or_else(|| slot.session.result.as_ref().map(|r| r.graded_at))
    }

    pub fn view(&self) -> SessionView {
        let now = self.clock.now();
        self.slot().session.view(now)
    }

    /// Applies one event under the session lock and fires the hooks.
    pub fn dispatch(&self, event: SessionEvent) -> Result<Transition, QuizError> {
        let transition = {
            let mut slot = self.slot();
            if slot.discarded_at.is_some() {
                return Err(QuizError::SessionDiscarded);
            }

            let now = self.clock.now();
            let transition = slot.session.apply(event, now)?;

            if transition.mutated {
                self.hooks.on_snapshot(&slot.session);
            }
            if let Some(completion) = &transition.completion {
                self.hooks.on_complete(&slot.session, completion);
            }
            transition
        };

        if transition.completion.is_some() {
            self.pause();
        }
        Ok(transition)
    }

    /// Starts the clock monitor. Each tick recomputes remaining time from the absolute
    /// deadline, so a paused and resumed ticker stays correct.
    pub fn start_ticker(self: &Arc<Self>, period: Duration) {
        if self.is_finished() {
            return;
        }

        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(live) = weak.upgrade() else { break };
                match live.dispatch(SessionEvent::Tick) {
                    Ok(_) if !live.is_finished() => {}
                    _ => break,
                }
            }
        });

        let previous = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stops the ticker without touching the session.
    pub fn pause(&self) {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Abandons a running session: stops the timer and rejects further events.
    ///
    /// Never grades. A session that already finished (or whose deadline has passed) is left
    /// alone so its result stays readable. Returns false when nothing was discarded.
    pub fn discard(&self) -> bool {
        let expired = {
            let mut slot = self.slot();
            if slot.discarded_at.is_some() {
                return false;
            }

            let now = self.clock.now();
            let expiry = slot.session.expire_if_due(now);
            if let Some(completion) = &expiry {
                self.hooks.on_snapshot(&slot.session);
                self.hooks.on_complete(&slot.session, completion);
            } else if slot.session.is_in_progress() {
                slot.discarded_at = Some(now);
            } else {
                return false;
            }
            expiry.is_some()
        };

        self.pause();
        if expired {
            return false;
        }
        tracing::info!(session_id = %self.id, "Quiz session abandoned");
        self.hooks.on_discard(self.id);
        true
    }
}

impl Drop for LiveSession {
    fn drop(&mut self) {
        self.pause();
    }
}
