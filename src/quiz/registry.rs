// src/quiz/registry.rs

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use super::live::LiveSession;

/// Live sessions held in memory, keyed by session id.
///
/// Finished and abandoned sessions are kept for `retention` so results (or the fact
/// that the attempt was abandoned) stay readable, then dropped on the next insert.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<LiveSession>>>,
    retention: TimeDelta,
}

impl SessionRegistry {
    pub fn new(retention: TimeDelta) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            retention,
        }
    }

    pub fn insert(&self, live: Arc<LiveSession>, now: DateTime<Utc>) {
        self.prune(now);
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(live.id(), live);
    }

    /// Inserts `live` unless a session with the same id is already held; returns the one kept.
    pub fn insert_if_absent(&self, live: Arc<LiveSession>) -> Arc<LiveSession> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(live.id())
            .or_insert(live)
            .clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<LiveSession>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn remove(&self, id: Uuid) -> Option<Arc<LiveSession>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops sessions that were graded or abandoned more than `retention` ago.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();

        sessions.retain(|_, live| match live.finished_at() {
            Some(finished_at) => finished_at + self.retention > now,
            None => true,
        });

        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned finished quiz sessions");
        }
        pruned
    }
}
