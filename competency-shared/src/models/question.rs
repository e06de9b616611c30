/// Questionnaire questions
///
/// Each question belongs to exactly one competency item and is answered with
/// an integer score in `1..=max_score`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::competency_item::CompetencyItem;

const QUESTION_COLUMNS: &str =
    "id, text, competency_item_id, display_order, max_score, created_at, updated_at";

/// Default upper bound of the score scale
pub const DEFAULT_MAX_SCORE: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    pub competency_item_id: Uuid,

    #[serde(rename = "order")]
    pub display_order: i32,

    /// Highest accepted score, always positive
    pub max_score: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Whether `score` is on this question's scale
    pub fn accepts_score(&self, score: i32) -> bool {
        (1..=self.max_score).contains(&score)
    }
}

/// Question with its competency item loaded
#[derive(Debug, Clone, Serialize)]
pub struct QuestionWithCompetency {
    #[serde(flatten)]
    pub question: Question,

    pub competency_item: CompetencyItem,
}

/// Question annotated with one user's current score
#[derive(Debug, Clone, Serialize)]
pub struct QuestionWithAnswer {
    #[serde(flatten)]
    pub question: Question,

    pub competency_item: CompetencyItem,

    /// The user's score, `None` if not answered yet
    pub user_answer: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct CreateQuestion {
    pub text: String,
    pub competency_item_id: Uuid,
    pub display_order: i32,
    pub max_score: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateQuestion {
    pub text: Option<String>,
    pub competency_item_id: Option<Uuid>,
    pub display_order: Option<i32>,
    pub max_score: Option<i32>,
}

impl Question {
    pub async fn create<'e, E>(executor: E, data: CreateQuestion) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO questions (text, competency_item_id, display_order, max_score)
             VALUES ($1, $2, $3, $4)
             RETURNING {QUESTION_COLUMNS}"
        );

        sqlx::query_as::<_, Question>(&query)
            .bind(data.text)
            .bind(data.competency_item_id)
            .bind(data.display_order)
            .bind(data.max_score)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1");

        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Loads the questions with the given ids; missing ids are simply absent
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ANY($1)");

        sqlx::query_as::<_, Question>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Every question in display order
    pub async fn list_all<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY display_order ASC, id ASC"
        );

        sqlx::query_as::<_, Question>(&query)
            .fetch_all(executor)
            .await
    }

    /// Applies a partial update, returning `None` if the question doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateQuestion,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE questions SET
                 text = COALESCE($2, text),
                 competency_item_id = COALESCE($3, competency_item_id),
                 display_order = COALESCE($4, display_order),
                 max_score = COALESCE($5, max_score),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {QUESTION_COLUMNS}"
        );

        sqlx::query_as::<_, Question>(&query)
            .bind(id)
            .bind(data.text)
            .bind(data.competency_item_id)
            .bind(data.display_order)
            .bind(data.max_score)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Questions in display order with their competency item
    pub async fn list_with_competency(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<QuestionWithCompetency>, sqlx::Error> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM questions
             ORDER BY display_order ASC, id ASC
             LIMIT $1 OFFSET $2"
        );

        let questions = sqlx::query_as::<_, Question>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let items = items_by_id(CompetencyItem::list_ordered(pool).await?);

        Ok(questions
            .into_iter()
            .filter_map(|question| {
                let competency_item = items.get(&question.competency_item_id)?.clone();
                Some(QuestionWithCompetency {
                    question,
                    competency_item,
                })
            })
            .collect())
    }

    /// Every question with its item and `user_id`'s score, if any
    pub async fn list_with_user_answers(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<QuestionWithAnswer>, sqlx::Error> {
        let questions = Self::list_all(pool).await?;
        let items = items_by_id(CompetencyItem::list_ordered(pool).await?);

        let scores: HashMap<Uuid, i32> =
            sqlx::query_as::<_, (Uuid, i32)>("SELECT question_id, score FROM answers WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?
                .into_iter()
                .collect();

        Ok(questions
            .into_iter()
            .filter_map(|question| {
                let competency_item = items.get(&question.competency_item_id)?.clone();
                let user_answer = scores.get(&question.id).copied();
                Some(QuestionWithAnswer {
                    question,
                    competency_item,
                    user_answer,
                })
            })
            .collect())
    }
}

fn items_by_id(items: Vec<CompetencyItem>) -> HashMap<Uuid, CompetencyItem> {
    items.into_iter().map(|item| (item.id, item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(max_score: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "I set a clear direction for my team".to_string(),
            competency_item_id: Uuid::new_v4(),
            display_order: 1,
            max_score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_accepts_score_range() {
        let q = question(DEFAULT_MAX_SCORE);

        assert!(q.accepts_score(1));
        assert!(q.accepts_score(5));
        assert!(!q.accepts_score(0));
        assert!(!q.accepts_score(6));
        assert!(!q.accepts_score(-1));
    }

    #[test]
    fn test_custom_max_score() {
        let q = question(10);
        assert!(q.accepts_score(10));
        assert!(!q.accepts_score(11));
    }

    #[test]
    fn test_question_with_answer_serialization() {
        let q = question(5);
        let item = CompetencyItem {
            id: q.competency_item_id,
            name: "Leadership".to_string(),
            description: None,
            display_order: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let answered = QuestionWithAnswer {
            question: q.clone(),
            competency_item: item.clone(),
            user_answer: Some(4),
        };
        let json = serde_json::to_value(&answered).unwrap();
        assert_eq!(json["user_answer"], 4);
        assert_eq!(json["competency_item"]["name"], "Leadership");
        assert_eq!(json["max_score"], 5);

        let unanswered = QuestionWithAnswer {
            question: q,
            competency_item: item,
            user_answer: None,
        };
        let json = serde_json::to_value(&unanswered).unwrap();
        assert!(json["user_answer"].is_null());
    }
}
