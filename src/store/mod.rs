// src/store/mod.rs

//! Collaborators the quiz engine talks to: the question bank and the checkpoint store.

pub mod memory;
pub mod postgres;
pub mod writer;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    models::attempt::AttemptRecord,
    quiz::{QuestionDefinition, QuizSession},
};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use writer::CheckpointWriter;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Supplies the questions of an assignment, in bank order.
///
/// Implementations guarantee every returned question satisfies the option invariant.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    async fn questions_for(&self, assignment_id: &str) -> Result<Vec<QuestionDefinition>, StoreError>;
}

/// Durable copies of sessions and their results, for reload recovery and history.
///
/// The engine never waits on these calls; failures are only logged.
#[async_trait]
pub trait SessionCheckpoint: Send + Sync {
    async fn save_snapshot(&self, session: &QuizSession) -> Result<(), StoreError>;

    async fn load_snapshot(&self, session_id: Uuid) -> Result<Option<QuizSession>, StoreError>;

    async fn remove_snapshot(&self, session_id: Uuid) -> Result<(), StoreError>;

    async fn save_attempt(&self, record: &AttemptRecord) -> Result<(), StoreError>;

    /// Newest first.
    async fn attempts_for_owner(&self, owner_id: &str) -> Result<Vec<AttemptRecord>, StoreError>;
}
