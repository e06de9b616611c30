/// Questionnaire answers
///
/// One row per (user, question). Submitting again overwrites the score and
/// refreshes `submitted_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::ai_feedback::AiFeedback;

const ANSWER_COLUMNS: &str = "id, user_id, question_id, score, submitted_at";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub question_id: Uuid,
    pub score: i32,
    pub submitted_at: DateTime<Utc>,
}

/// A single score for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub score: i32,
}

impl Answer {
    /// The user's answer to one question
    pub async fn find_for_user_question(
        pool: &PgPool,
        user_id: Uuid,
        question_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE user_id = $1 AND question_id = $2"
        );

        sqlx::query_as::<_, Answer>(&query)
            .bind(user_id)
            .bind(question_id)
            .fetch_optional(pool)
            .await
    }

    /// Inserts or overwrites the user's answer to one question
    pub async fn upsert<'e, E>(
        executor: E,
        user_id: Uuid,
        input: AnswerInput,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO answers (user_id, question_id, score)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT answers_user_question_key
             DO UPDATE SET score = EXCLUDED.score, submitted_at = NOW()
             RETURNING {ANSWER_COLUMNS}"
        );

        sqlx::query_as::<_, Answer>(&query)
            .bind(user_id)
            .bind(input.question_id)
            .bind(input.score)
            .fetch_one(executor)
            .await
    }

    /// Upserts a batch of answers atomically
    ///
    /// If the same question appears twice the later score wins. The user's
    /// cached feedback is deleted in the same transaction.
    pub async fn bulk_upsert(
        pool: &PgPool,
        user_id: Uuid,
        inputs: &[AnswerInput],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut saved = Vec::with_capacity(inputs.len());

        for input in inputs {
            saved.push(Self::upsert(&mut *tx, user_id, *input).await?);
        }

        let feedback_dropped = AiFeedback::invalidate(&mut *tx, user_id).await?;

        tx.commit().await?;

        tracing::debug!(%user_id, count = saved.len(), feedback_dropped, "Answers upserted");
        Ok(saved)
    }

    /// All of the user's answers, most recent first
    pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {ANSWER_COLUMNS} FROM answers
             WHERE user_id = $1
             ORDER BY submitted_at DESC, id ASC"
        );

        sqlx::query_as::<_, Answer>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }
}
