/// Company-wide competency averages
///
/// Derived data: one row per competency item holding the mean of every
/// user's score for that item and how many distinct users contributed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use uuid::Uuid;

use super::competency_item::CompetencyItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanyAverageCompetency {
    pub id: Uuid,
    pub competency_item_id: Uuid,
    pub average_score: f64,

    /// Distinct users with a score for this item
    pub total_users: i32,

    pub calculated_at: DateTime<Utc>,
}

/// Company average with its competency item loaded
#[derive(Debug, Clone, Serialize)]
pub struct CompanyAverageWithItem {
    #[serde(flatten)]
    pub average: CompanyAverageCompetency,

    pub competency_item: CompetencyItem,
}

/// One aggregated row straight from `user_competencies`
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct ItemAggregate {
    pub competency_item_id: Uuid,
    pub average_score: f64,
    pub total_users: i64,
}

impl CompanyAverageCompetency {
    /// Averages every user's score per item
    pub async fn aggregate<'e, E>(executor: E) -> Result<Vec<ItemAggregate>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ItemAggregate>(
            r#"
            SELECT competency_item_id,
                   AVG(score) AS average_score,
                   COUNT(DISTINCT user_id) AS total_users
            FROM user_competencies
            GROUP BY competency_item_id
            "#,
        )
        .fetch_all(executor)
        .await
    }

    /// Writes the average for one item, replacing any previous value
    pub async fn upsert<'e, E>(
        executor: E,
        competency_item_id: Uuid,
        average_score: f64,
        total_users: i32,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, CompanyAverageCompetency>(
            r#"
            INSERT INTO company_average_competencies (competency_item_id, average_score, total_users)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT company_average_competencies_item_key
            DO UPDATE SET average_score = EXCLUDED.average_score,
                          total_users = EXCLUDED.total_users,
                          calculated_at = NOW()
            RETURNING id, competency_item_id, average_score, total_users, calculated_at
            "#,
        )
        .bind(competency_item_id)
        .bind(average_score)
        .bind(total_users)
        .fetch_one(executor)
        .await
    }

    /// Drops averages for items nobody has a score for any more
    pub async fn delete_unscored<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM company_average_competencies ca
            WHERE NOT EXISTS (
                SELECT 1 FROM user_competencies uc
                WHERE uc.competency_item_id = ca.competency_item_id
            )
            "#,
        )
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// All averages in competency display order
    pub async fn list<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, CompanyAverageCompetency>(
            r#"
            SELECT ca.id, ca.competency_item_id, ca.average_score, ca.total_users, ca.calculated_at
            FROM company_average_competencies ca
            JOIN competency_items ci ON ci.id = ca.competency_item_id
            ORDER BY ci.display_order ASC, ci.name ASC
            "#,
        )
        .fetch_all(executor)
        .await
    }
}
