// src/store/writer.rs

use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedSender};
use uuid::Uuid;

use super::SessionCheckpoint;
use crate::{
    models::attempt::AttemptRecord,
    quiz::{Completion, QuizSession, SessionHooks},
};

enum CheckpointJob {
    Snapshot(Box<QuizSession>),
    Completed(Box<QuizSession>, Box<AttemptRecord>),
    Discarded(Uuid),
}

/// Session hooks that persist through a single background task.
///
/// Sending never blocks, and one consumer keeps writes in mutation order.
/// A failed write is logged and dropped; the in-memory session stays authoritative.
#[derive(Clone)]
pub struct CheckpointWriter {
    tx: UnboundedSender<CheckpointJob>,
}

impl CheckpointWriter {
    /// Spawns the writer task. Must be called inside a Tokio runtime.
    pub fn spawn(store: Arc<dyn SessionCheckpoint>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<CheckpointJob>();

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    CheckpointJob::Snapshot(session) => {
                        if let Err(e) = store.save_snapshot(&session).await {
                            tracing::warn!(session_id = %session.id, "Failed to checkpoint session: {}", e);
                        }
                    }
                    CheckpointJob::Completed(session, record) => {
                        if let Err(e) = store.save_snapshot(&session).await {
                            tracing::warn!(session_id = %session.id, "Failed to checkpoint session: {}", e);
                        }
                        if let Err(e) = store.save_attempt(&record).await {
                            tracing::warn!(session_id = %session.id, "Failed to store quiz result: {}", e);
                        }
                    }
                    CheckpointJob::Discarded(session_id) => {
                        if let Err(e) = store.remove_snapshot(session_id).await {
                            tracing::warn!(%session_id, "Failed to remove checkpoint: {}", e);
                        }
                    }
                }
            }
            tracing::debug!("Checkpoint writer stopped");
        });

        Self { tx }
    }

    fn send(&self, job: CheckpointJob) {
        if self.tx.send(job).is_err() {
            tracing::warn!("Checkpoint writer is gone; dropping write");
        }
    }
}

impl SessionHooks for CheckpointWriter {
    fn on_snapshot(&self, session: &QuizSession) {
        self.send(CheckpointJob::Snapshot(Box::new(session.clone())));
    }

    fn on_complete(&self, session: &QuizSession, completion: &Completion) {
        self.send(CheckpointJob::Completed(
            Box::new(session.clone()),
            Box::new(AttemptRecord::from_completion(session, completion)),
        ));
    }

    fn on_discard(&self, session_id: Uuid) {
        self.send(CheckpointJob::Discarded(session_id));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        quiz::{
            AssignmentConfig, LiveSession, ManualClock, SessionEvent,
            builder::{create_session, tests::assignment},
        },
        store::MemoryStore,
    };

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_completion_is_stored_once() {
        let store = Arc::new(MemoryStore::new());
        let writer = CheckpointWriter::spawn(store.clone());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut rng = StdRng::seed_from_u64(6);
        let session = create_session(
            "learner-9",
            &assignment(2, AssignmentConfig::new(5)),
            Utc::now(),
            &mut rng,
        )
        .unwrap();
        let live = LiveSession::new(session, clock, Arc::new(writer));

        live.dispatch(SessionEvent::Submit).unwrap();
        live.dispatch(SessionEvent::Submit).unwrap();
        settle().await;

        let attempts = store.attempts_for_owner("learner-9").await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].status, "submitted");
        let snapshot = store.load_snapshot(live.id()).await.unwrap().unwrap();
        assert!(snapshot.status.is_terminal());
    }

    #[tokio::test]
    async fn test_discard_removes_snapshot() {
        let store = Arc::new(MemoryStore::new());
        let writer = CheckpointWriter::spawn(store.clone());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut rng = StdRng::seed_from_u64(6);
        let session = create_session(
            "learner",
            &assignment(2, AssignmentConfig::new(5)),
            Utc::now(),
            &mut rng,
        )
        .unwrap();
        let live = LiveSession::new(session, clock, Arc::new(writer));
        settle().await;
        assert_eq!(store.snapshot_count(), 1);

        live.discard();
        settle().await;

        assert_eq!(store.snapshot_count(), 0);
        assert!(store.attempts_for_owner("learner").await.unwrap().is_empty());
    }
}
