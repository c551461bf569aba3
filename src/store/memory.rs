// src/store/memory.rs

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{QuestionBank, SessionCheckpoint, StoreError};
use crate::{
    models::attempt::AttemptRecord,
    quiz::{QuestionDefinition, QuizSession},
};

/// Process-local question bank and checkpoint store.
#[derive(Default)]
pub struct MemoryStore {
    questions: RwLock<HashMap<String, Vec<QuestionDefinition>>>,
    snapshots: RwLock<HashMap<Uuid, QuizSession>>,
    attempts: RwLock<Vec<AttemptRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_assignment(self, assignment_id: &str, questions: Vec<QuestionDefinition>) -> Self {
        self.set_assignment(assignment_id, questions);
        self
    }

    /// Replaces the questions of an assignment.
    pub fn set_assignment(&self, assignment_id: &str, questions: Vec<QuestionDefinition>) {
        self.questions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(assignment_id.to_string(), questions);
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl QuestionBank for MemoryStore {
    async fn questions_for(&self, assignment_id: &str) -> Result<Vec<QuestionDefinition>, StoreError> {
        Ok(self
            .questions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(assignment_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl SessionCheckpoint for MemoryStore {
    async fn save_snapshot(&self, session: &QuizSession) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn load_snapshot(&self, session_id: Uuid) -> Result<Option<QuizSession>, StoreError> {
        Ok(self
            .snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .cloned())
    }

    async fn remove_snapshot(&self, session_id: Uuid) -> Result<(), StoreError> {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id);
        Ok(())
    }

    async fn save_attempt(&self, record: &AttemptRecord) -> Result<(), StoreError> {
        let mut attempts = self.attempts.write().unwrap_or_else(PoisonError::into_inner);
        if !attempts.iter().any(|a| a.session_id == record.session_id) {
            attempts.push(record.clone());
        }
        Ok(())
    }

    async fn attempts_for_owner(&self, owner_id: &str) -> Result<Vec<AttemptRecord>, StoreError> {
        let mut records: Vec<AttemptRecord> = self
            .attempts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(records)
    }
}
