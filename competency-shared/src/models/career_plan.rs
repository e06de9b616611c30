/// User career plans
///
/// Free-text self-description a user can attach to their evaluation. At most
/// one plan per user; the AI feedback prompt includes it when present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const PLAN_COLUMNS: &str = "id, user_id, career_direction, target_position, target_timeframe, \
                            strengths_to_enhance, weaknesses_to_overcome, specific_goals, \
                            personality_traits, preferred_learning_style, challenges_faced, \
                            motivation_factors, created_at, updated_at";

/// Upper bound on each free-text field
pub const MAX_FIELD_LENGTH: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserCareerPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub career_direction: Option<String>,
    pub target_position: Option<String>,
    pub target_timeframe: Option<String>,
    pub strengths_to_enhance: Option<String>,
    pub weaknesses_to_overcome: Option<String>,
    pub specific_goals: Option<String>,
    pub personality_traits: Option<String>,
    pub preferred_learning_style: Option<String>,
    pub challenges_faced: Option<String>,
    pub motivation_factors: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The ten free-text fields of a plan
///
/// Used for both create and update. On update, `None` leaves the stored
/// value untouched. Each field is capped at [`MAX_FIELD_LENGTH`] characters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CareerPlanFields {
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub career_direction: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub target_position: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub target_timeframe: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub strengths_to_enhance: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub weaknesses_to_overcome: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub specific_goals: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub personality_traits: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub preferred_learning_style: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub challenges_faced: Option<String>,
    #[validate(length(max = MAX_FIELD_LENGTH))]
    pub motivation_factors: Option<String>,
}

impl UserCareerPlan {
    /// Labeled field values in a stable order, for prompt building
    pub fn labeled_fields(&self) -> [(&'static str, Option<&str>); 10] {
        [
            ("Career direction", self.career_direction.as_deref()),
            ("Target position", self.target_position.as_deref()),
            ("Target timeframe", self.target_timeframe.as_deref()),
            ("Strengths to enhance", self.strengths_to_enhance.as_deref()),
            ("Weaknesses to overcome", self.weaknesses_to_overcome.as_deref()),
            ("Specific goals", self.specific_goals.as_deref()),
            ("Personality traits", self.personality_traits.as_deref()),
            ("Preferred learning style", self.preferred_learning_style.as_deref()),
            ("Challenges faced", self.challenges_faced.as_deref()),
            ("Motivation factors", self.motivation_factors.as_deref()),
        ]
    }

    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM user_career_plans WHERE user_id = $1");

        sqlx::query_as::<_, UserCareerPlan>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Creates the user's plan
    ///
    /// # Errors
    ///
    /// Unique violation on `user_career_plans_user_key` if a plan exists.
    pub async fn create_for_user(
        pool: &PgPool,
        user_id: Uuid,
        fields: CareerPlanFields,
    ) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_career_plans (
                 user_id, career_direction, target_position, target_timeframe,
                 strengths_to_enhance, weaknesses_to_overcome, specific_goals,
                 personality_traits, preferred_learning_style, challenges_faced,
                 motivation_factors
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {PLAN_COLUMNS}"
        );

        sqlx::query_as::<_, UserCareerPlan>(&query)
            .bind(user_id)
            .bind(fields.career_direction)
            .bind(fields.target_position)
            .bind(fields.target_timeframe)
            .bind(fields.strengths_to_enhance)
            .bind(fields.weaknesses_to_overcome)
            .bind(fields.specific_goals)
            .bind(fields.personality_traits)
            .bind(fields.preferred_learning_style)
            .bind(fields.challenges_faced)
            .bind(fields.motivation_factors)
            .fetch_one(pool)
            .await
    }

    /// Updates the provided fields of the user's plan
    ///
    /// Returns `None` if the user has no plan.
    pub async fn update_for_user(
        pool: &PgPool,
        user_id: Uuid,
        fields: CareerPlanFields,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE user_career_plans SET
                 career_direction = COALESCE($2, career_direction),
                 target_position = COALESCE($3, target_position),
                 target_timeframe = COALESCE($4, target_timeframe),
                 strengths_to_enhance = COALESCE($5, strengths_to_enhance),
                 weaknesses_to_overcome = COALESCE($6, weaknesses_to_overcome),
                 specific_goals = COALESCE($7, specific_goals),
                 personality_traits = COALESCE($8, personality_traits),
                 preferred_learning_style = COALESCE($9, preferred_learning_style),
                 challenges_faced = COALESCE($10, challenges_faced),
                 motivation_factors = COALESCE($11, motivation_factors),
                 updated_at = NOW()
             WHERE user_id = $1
             RETURNING {PLAN_COLUMNS}"
        );

        sqlx::query_as::<_, UserCareerPlan>(&query)
            .bind(user_id)
            .bind(fields.career_direction)
            .bind(fields.target_position)
            .bind(fields.target_timeframe)
            .bind(fields.strengths_to_enhance)
            .bind(fields.weaknesses_to_overcome)
            .bind(fields.specific_goals)
            .bind(fields.personality_traits)
            .bind(fields.preferred_learning_style)
            .bind(fields.challenges_faced)
            .bind(fields.motivation_factors)
            .fetch_optional(pool)
            .await
    }

    /// Deletes the user's plan, returning false if there was none
    pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_career_plans WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_fields_order_and_values() {
        let plan = UserCareerPlan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            career_direction: Some("Engineering management".to_string()),
            target_position: None,
            target_timeframe: Some("3 years".to_string()),
            strengths_to_enhance: None,
            weaknesses_to_overcome: None,
            specific_goals: None,
            personality_traits: None,
            preferred_learning_style: None,
            challenges_faced: None,
            motivation_factors: Some("Impact".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let fields = plan.labeled_fields();
        assert_eq!(fields[0], ("Career direction", Some("Engineering management")));
        assert_eq!(fields[1], ("Target position", None));
        assert_eq!(fields[2].1, Some("3 years"));
        assert_eq!(fields[9], ("Motivation factors", Some("Impact")));
    }

    #[test]
    fn test_fields_deserialize_partial() {
        let fields: CareerPlanFields =
            serde_json::from_str(r#"{"career_direction": "Sales lead"}"#).unwrap();

        assert_eq!(fields.career_direction.as_deref(), Some("Sales lead"));
        assert!(fields.motivation_factors.is_none());
    }

    #[test]
    fn test_fields_length_limit() {
        let at_limit = CareerPlanFields {
            specific_goals: Some("g".repeat(MAX_FIELD_LENGTH as usize)),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_long = CareerPlanFields {
            specific_goals: Some("g".repeat(MAX_FIELD_LENGTH as usize + 1)),
            ..Default::default()
        };
        let errors = too_long.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("specific_goals"));
    }
}
