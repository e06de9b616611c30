/// Competency items
///
/// A competency item is a named skill category (e.g. leadership) that groups
/// the questions users score themselves on. Items are presented in
/// `display_order`, which is exposed to clients as `order`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::question::Question;

const ITEM_COLUMNS: &str = "id, name, description, display_order, created_at, updated_at";

/// Competency item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompetencyItem {
    pub id: Uuid,

    /// Unique item name
    pub name: String,

    pub description: Option<String>,

    /// Position in listings, ascending
    #[serde(rename = "order")]
    pub display_order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Competency item together with its questions
#[derive(Debug, Clone, Serialize)]
pub struct CompetencyItemWithQuestions {
    #[serde(flatten)]
    pub item: CompetencyItem,

    /// Questions in display order
    pub questions: Vec<Question>,
}

/// Input for creating an item
#[derive(Debug, Clone)]
pub struct CreateCompetencyItem {
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
}

/// Partial update of an item
#[derive(Debug, Clone, Default)]
pub struct UpdateCompetencyItem {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub display_order: Option<i32>,
}

impl CompetencyItem {
    /// Inserts a new item
    ///
    /// # Errors
    ///
    /// Unique violation on `competency_items_name_key` if the name is taken.
    pub async fn create<'e, E>(executor: E, data: CreateCompetencyItem) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO competency_items (name, description, display_order)
             VALUES ($1, $2, $3)
             RETURNING {ITEM_COLUMNS}"
        );

        sqlx::query_as::<_, CompetencyItem>(&query)
            .bind(data.name)
            .bind(data.description)
            .bind(data.display_order)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM competency_items WHERE id = $1");

        sqlx::query_as::<_, CompetencyItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All items in display order
    pub async fn list_ordered<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM competency_items ORDER BY display_order ASC, name ASC"
        );

        sqlx::query_as::<_, CompetencyItem>(&query)
            .fetch_all(executor)
            .await
    }

    /// Number of items in the catalogue
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar("SELECT COUNT(*) FROM competency_items")
            .fetch_one(executor)
            .await
    }

    /// Applies a partial update, returning `None` if the item doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCompetencyItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE competency_items SET
                 name = COALESCE($2, name),
                 description = CASE WHEN $3 THEN $4 ELSE description END,
                 display_order = COALESCE($5, display_order),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {ITEM_COLUMNS}"
        );

        let (set_description, description) = match data.description {
            Some(value) => (true, value),
            None => (false, None),
        };

        sqlx::query_as::<_, CompetencyItem>(&query)
            .bind(id)
            .bind(data.name)
            .bind(set_description)
            .bind(description)
            .bind(data.display_order)
            .fetch_optional(pool)
            .await
    }

    /// Deletes an item and, by cascade, its questions and derived scores
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM competency_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Items in display order, each with its questions in display order
    ///
    /// `limit`/`offset` page over items, not questions.
    pub async fn list_with_questions(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CompetencyItemWithQuestions>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM competency_items
             ORDER BY display_order ASC, name ASC
             LIMIT $1 OFFSET $2"
        );

        let items = sqlx::query_as::<_, CompetencyItem>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let questions = Question::list_all(pool).await?;

        Ok(attach_questions(items, questions))
    }
}

/// Groups questions under their items, keeping both orderings
///
/// Questions whose item isn't in `items` are dropped.
pub fn attach_questions(
    items: Vec<CompetencyItem>,
    questions: Vec<Question>,
) -> Vec<CompetencyItemWithQuestions> {
    let mut by_item: HashMap<Uuid, Vec<Question>> = HashMap::new();
    for question in questions {
        by_item
            .entry(question.competency_item_id)
            .or_default()
            .push(question);
    }

    items
        .into_iter()
        .map(|item| {
            let mut questions = by_item.remove(&item.id).unwrap_or_default();
            questions.sort_by_key(|q| q.display_order);
            CompetencyItemWithQuestions { item, questions }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, order: i32) -> CompetencyItem {
        CompetencyItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some(format!("{} description", name)),
            display_order: order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn question(item_id: Uuid, order: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: format!("question {}", order),
            competency_item_id: item_id,
            display_order: order,
            max_score: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_order_serialized_as_order() {
        let json = serde_json::to_value(item("Leadership", 3)).unwrap();
        assert_eq!(json["order"], 3);
        assert!(json.get("display_order").is_none());
    }

    #[test]
    fn test_attach_questions_groups_and_sorts() {
        let first = item("Leadership", 1);
        let second = item("Communication", 2);
        let empty = item("Teamwork", 3);

        let questions = vec![
            question(second.id, 2),
            question(first.id, 2),
            question(first.id, 1),
            question(second.id, 1),
            question(Uuid::new_v4(), 1),
        ];

        let grouped = attach_questions(vec![first.clone(), second.clone(), empty], questions);

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].item.id, first.id);
        assert_eq!(
            grouped[0].questions.iter().map(|q| q.display_order).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(grouped[1].questions.len(), 2);
        assert!(grouped[2].questions.is_empty());
    }

    #[test]
    fn test_item_with_questions_flattens() {
        let parent = item("Leadership", 1);
        let with = CompetencyItemWithQuestions {
            questions: vec![question(parent.id, 1)],
            item: parent,
        };

        let json = serde_json::to_value(&with).unwrap();
        assert_eq!(json["name"], "Leadership");
        assert_eq!(json["questions"][0]["order"], 1);
    }
}
