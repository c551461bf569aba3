// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use super::{QuestionBank, SessionCheckpoint, StoreError};
use crate::{
    models::{attempt::AttemptRecord, question::QuestionRow},
    quiz::{QuestionDefinition, QuizSession},
};

/// Question bank and checkpoint store backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionBank for PgStore {
    async fn questions_for(&self, assignment_id: &str) -> Result<Vec<QuestionDefinition>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT
                id,
                assignment_id,
                prompt,
                prompt_kind,
                options,
                correct_option_id,
                explanation
            FROM questions
            WHERE assignment_id = $1
            ORDER BY position, id
            "#,
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch questions for {}: {:?}", assignment_id, e);
            StoreError::from(e)
        })?;

        // Rows breaking the option invariant never reach the engine.
        let questions = rows
            .into_iter()
            .filter_map(|row| match QuestionDefinition::try_from(row) {
                Ok(question) => Some(question),
                Err(reason) => {
                    tracing::warn!("Skipping invalid question: {}", reason);
                    None
                }
            })
            .collect();

        Ok(questions)
    }
}

#[async_trait]
impl SessionCheckpoint for PgStore {
    async fn save_snapshot(&self, session: &QuizSession) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO quiz_sessions (id, owner_id, assignment_id, status, snapshot, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                snapshot = EXCLUDED.snapshot,
                updated_at = NOW()
            "#,
        )
        .bind(session.id)
        .bind(&session.owner_id)
        .bind(&session.assignment_id)
        .bind(session.status.as_str())
        .bind(Json(session))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_snapshot(&self, session_id: Uuid) -> Result<Option<QuizSession>, StoreError> {
        let snapshot = sqlx::query_scalar::<_, Json<QuizSession>>(
            "SELECT snapshot FROM quiz_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot.map(|Json(session)| session))
    }

    async fn remove_snapshot(&self, session_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM quiz_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_attempt(&self, record: &AttemptRecord) -> Result<(), StoreError> {
        // Grading happens once per session; a replayed write keeps the first row.
        sqlx::query(
            r#"
            INSERT INTO quiz_results (
                session_id, owner_id, assignment_id, attempt_group_id, attempt_number,
                status, reason, result, completed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(record.session_id)
        .bind(&record.owner_id)
        .bind(&record.assignment_id)
        .bind(record.attempt_group_id)
        .bind(record.attempt_number)
        .bind(&record.status)
        .bind(&record.reason)
        .bind(&record.result)
        .bind(record.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn attempts_for_owner(&self, owner_id: &str) -> Result<Vec<AttemptRecord>, StoreError> {
        let records = sqlx::query_as::<_, AttemptRecord>(
            r#"
            SELECT
                session_id,
                owner_id,
                assignment_id,
                attempt_group_id,
                attempt_number,
                status,
                reason,
                result,
                completed_at
            FROM quiz_results
            WHERE owner_id = $1
            ORDER BY completed_at DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
