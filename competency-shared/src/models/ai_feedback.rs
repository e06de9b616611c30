/// Cached AI feedback
///
/// At most one row per user. Regenerating overwrites it and submitting new
/// answers deletes it. Readers decide freshness from `generated_at`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, PgExecutor, PgPool};
use uuid::Uuid;

const FEEDBACK_COLUMNS: &str = "id, user_id, feedback_content, career_suggestions, \
                                book_recommendations, generated_at, updated_at";

/// Named narrative sections of a feedback report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSections {
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub improvements: String,
    #[serde(default)]
    pub action_plan: String,
    #[serde(default)]
    pub learning_resources: String,
    #[serde(default)]
    pub reality_check: String,
    #[serde(default)]
    pub overall: String,
}

impl FeedbackSections {
    /// True when every section is blank
    pub fn is_blank(&self) -> bool {
        [
            &self.strengths,
            &self.improvements,
            &self.action_plan,
            &self.learning_resources,
            &self.reality_check,
            &self.overall,
        ]
        .iter()
        .all(|section| section.trim().is_empty())
    }
}

/// A recommended book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecommendation {
    pub title: String,
    pub author: String,
    pub reason: String,
    pub category: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AiFeedback {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feedback_content: Json<FeedbackSections>,
    pub career_suggestions: Json<Vec<String>>,
    pub book_recommendations: Json<Vec<BookRecommendation>>,
    pub generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content of a freshly generated report
#[derive(Debug, Clone, PartialEq)]
pub struct NewAiFeedback {
    pub feedback_content: FeedbackSections,
    pub career_suggestions: Vec<String>,
    pub book_recommendations: Vec<BookRecommendation>,
}

/// Whether a record generated at `generated_at` may still be served at `now`
///
/// The boundary is inclusive: a record exactly `max_age` old is fresh.
pub fn is_fresh(generated_at: DateTime<Utc>, now: DateTime<Utc>, max_age: Duration) -> bool {
    generated_at >= now - max_age
}

impl AiFeedback {
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {FEEDBACK_COLUMNS} FROM ai_feedback WHERE user_id = $1");

        sqlx::query_as::<_, AiFeedback>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The user's record if it was generated within `max_age`
    pub async fn find_fresh(
        pool: &PgPool,
        user_id: Uuid,
        max_age: Duration,
    ) -> Result<Option<Self>, sqlx::Error> {
        let now = Utc::now();

        Ok(Self::find_by_user(pool, user_id)
            .await?
            .filter(|record| is_fresh(record.generated_at, now, max_age)))
    }

    /// Stores a new report, overwriting the user's previous one
    pub async fn upsert(
        pool: &PgPool,
        user_id: Uuid,
        data: NewAiFeedback,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO ai_feedback (user_id, feedback_content, career_suggestions, book_recommendations)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT ai_feedback_user_key
             DO UPDATE SET feedback_content = EXCLUDED.feedback_content,
                           career_suggestions = EXCLUDED.career_suggestions,
                           book_recommendations = EXCLUDED.book_recommendations,
                           generated_at = NOW(),
                           updated_at = NOW()
             RETURNING {FEEDBACK_COLUMNS}"
        );

        sqlx::query_as::<_, AiFeedback>(&query)
            .bind(user_id)
            .bind(Json(data.feedback_content))
            .bind(Json(data.career_suggestions))
            .bind(Json(data.book_recommendations))
            .fetch_one(pool)
            .await
    }

    /// Drops the user's cached report, returning whether one existed
    pub async fn invalidate<'e, E>(executor: E, user_id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM ai_feedback WHERE user_id = $1")
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fresh_boundaries() {
        let now = Utc::now();
        let week = Duration::days(7);

        assert!(is_fresh(now, now, week));
        assert!(is_fresh(now - Duration::days(6), now, week));
        assert!(is_fresh(now - week, now, week));
        assert!(!is_fresh(now - week - Duration::seconds(1), now, week));
    }

    #[test]
    fn test_sections_blank_detection() {
        assert!(FeedbackSections::default().is_blank());

        let whitespace = FeedbackSections {
            overall: "   \n".to_string(),
            ..Default::default()
        };
        assert!(whitespace.is_blank());

        let filled = FeedbackSections {
            reality_check: "Growth takes effort.".to_string(),
            ..Default::default()
        };
        assert!(!filled.is_blank());
    }

    #[test]
    fn test_sections_deserialize_missing_keys() {
        let sections: FeedbackSections =
            serde_json::from_str(r#"{"strengths": "Clear communicator"}"#).unwrap();

        assert_eq!(sections.strengths, "Clear communicator");
        assert!(sections.action_plan.is_empty());
    }
}
