/// Per-user competency scores
///
/// Derived data: each row is the mean of a user's answer scores for one
/// competency item. Rows are rewritten by the scoring module on every results
/// read and never edited directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::competency_item::CompetencyItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserCompetency {
    pub id: Uuid,
    pub user_id: Uuid,
    pub competency_item_id: Uuid,
    pub score: f64,
    pub calculated_at: DateTime<Utc>,
}

/// User score with its competency item loaded
#[derive(Debug, Clone, Serialize)]
pub struct UserCompetencyWithItem {
    #[serde(flatten)]
    pub competency: UserCompetency,

    pub competency_item: CompetencyItem,
}

impl UserCompetency {
    /// Writes the user's score for one item, replacing any previous value
    pub async fn upsert<'e, E>(
        executor: E,
        user_id: Uuid,
        competency_item_id: Uuid,
        score: f64,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserCompetency>(
            r#"
            INSERT INTO user_competencies (user_id, competency_item_id, score)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT user_competencies_user_item_key
            DO UPDATE SET score = EXCLUDED.score, calculated_at = NOW()
            RETURNING id, user_id, competency_item_id, score, calculated_at
            "#,
        )
        .bind(user_id)
        .bind(competency_item_id)
        .bind(score)
        .fetch_one(executor)
        .await
    }

    /// Removes the user's rows for items not in `keep`
    ///
    /// Returns the number of rows removed.
    pub async fn delete_stale<'e, E>(
        executor: E,
        user_id: Uuid,
        keep: &[Uuid],
    ) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "DELETE FROM user_competencies WHERE user_id = $1 AND NOT (competency_item_id = ANY($2))",
        )
        .bind(user_id)
        .bind(keep)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// The user's scores in competency display order
    pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, UserCompetency>(
            r#"
            SELECT uc.id, uc.user_id, uc.competency_item_id, uc.score, uc.calculated_at
            FROM user_competencies uc
            JOIN competency_items ci ON ci.id = uc.competency_item_id
            WHERE uc.user_id = $1
            ORDER BY ci.display_order ASC, ci.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}
