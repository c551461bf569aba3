use std::sync::Arc;

use axum::extract::FromRef;
use chrono::TimeDelta;

use crate::{
    config::Config,
    quiz::{Clock, SessionHooks, SessionRegistry},
    store::{CheckpointWriter, QuestionBank, SessionCheckpoint},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub bank: Arc<dyn QuestionBank>,
    pub checkpoint: Arc<dyn SessionCheckpoint>,
    pub hooks: Arc<dyn SessionHooks>,
    pub sessions: Arc<SessionRegistry>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wires the engine to its collaborators. Spawns the checkpoint writer, so it must run
    /// inside a Tokio runtime.
    pub fn new(
        config: Config,
        bank: Arc<dyn QuestionBank>,
        checkpoint: Arc<dyn SessionCheckpoint>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let retention = TimeDelta::from_std(config.quiz.session_retention)
            .unwrap_or_else(|_| TimeDelta::hours(1));

        Self {
            hooks: Arc::new(CheckpointWriter::spawn(checkpoint.clone())),
            sessions: Arc::new(SessionRegistry::new(retention)),
            config,
            bank,
            checkpoint,
            clock,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
