/// AI feedback generation and caching
///
/// A feedback report has three parts:
///
/// - narrative sections from the completion model, or templated text when
///   the model is not configured, fails, or answers in an unusable shape
/// - rule-based career suggestions
/// - book recommendations
///
/// Reports are cached per user in `ai_feedback`. A plain read serves the
/// cached report while it is fresh and never calls the model; only an
/// explicit regeneration request does.
///
/// # Example
///
/// ```no_run
/// use competency_shared::feedback::{FeedbackService, llm::{LlmConfig, OpenAiClient}};
/// use competency_shared::models::user::User;
/// use chrono::Duration;
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example(pool: PgPool, user: User) -> Result<(), Box<dyn std::error::Error>> {
/// let client = OpenAiClient::new(LlmConfig::new("sk-..."))?;
/// let service = FeedbackService::new(Some(Arc::new(client)));
///
/// let report = service.get_feedback(&pool, &user, true, Duration::days(7)).await?;
/// assert!(!report.from_cache);
/// # Ok(())
/// # }
/// ```

pub mod fallback;
pub mod llm;
pub mod parser;
pub mod prompts;
pub mod recommendations;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    ai_feedback::{AiFeedback, BookRecommendation, FeedbackSections, NewAiFeedback},
    career_plan::UserCareerPlan,
    user::User,
};
use crate::scoring::{get_competency_results, CompetencyResults, ScoringError};
use llm::CompletionProvider;

/// Cache validity used when the caller has no preference
pub const DEFAULT_CACHE_VALIDITY_HOURS: i64 = 24;

/// Message returned when no fresh report exists and none was requested
pub const NOT_GENERATED_MESSAGE: &str =
    "No feedback has been generated yet. Request generation with force_regenerate=true.";

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("No competency results available; submit answers first")]
    NoResults,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Gap label for a competency compared with the company average
pub const GAP_STRENGTH: &str = "strength";
pub const GAP_NEEDS_IMPROVEMENT: &str = "needs improvement";

/// One competency as presented to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetencySnapshot {
    pub name: String,
    pub description: Option<String>,
    pub user_score: f64,
    pub company_average: Option<f64>,
    pub difference: Option<f64>,
    pub gap_analysis: &'static str,
}

impl CompetencySnapshot {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        user_score: f64,
        company_average: Option<f64>,
    ) -> Self {
        let difference = company_average.map(|average| user_score - average);
        let gap_analysis = match company_average {
            Some(average) if user_score > average => GAP_STRENGTH,
            _ => GAP_NEEDS_IMPROVEMENT,
        };

        Self {
            name: name.into(),
            description,
            user_score,
            company_average,
            difference,
            gap_analysis,
        }
    }
}

/// Everything a report is generated from
#[derive(Debug, Clone)]
pub struct FeedbackInput {
    pub user_name: String,
    pub competencies: Vec<CompetencySnapshot>,
    pub career_plan: Option<UserCareerPlan>,
}

impl FeedbackInput {
    /// Pairs each user score with the company average for the same item
    pub fn from_results(
        user_name: impl Into<String>,
        results: &CompetencyResults,
        career_plan: Option<UserCareerPlan>,
    ) -> Self {
        let competencies = results
            .user_competencies
            .iter()
            .map(|entry| {
                let company_average = results
                    .company_averages
                    .iter()
                    .find(|avg| avg.average.competency_item_id == entry.competency.competency_item_id)
                    .map(|avg| avg.average.average_score);

                CompetencySnapshot::new(
                    entry.competency_item.name.clone(),
                    entry.competency_item.description.clone(),
                    entry.competency.score,
                    company_average,
                )
            })
            .collect();

        Self {
            user_name: user_name.into(),
            competencies,
            career_plan,
        }
    }
}

/// Feedback report as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    /// `None` when nothing has been generated yet
    pub feedback: Option<FeedbackSections>,
    pub career_suggestions: Vec<String>,
    pub book_recommendations: Vec<BookRecommendation>,
    pub generated_at: Option<DateTime<Utc>>,
    pub from_cache: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FeedbackResponse {
    fn from_record(record: AiFeedback, from_cache: bool) -> Self {
        Self {
            feedback: Some(record.feedback_content.0),
            career_suggestions: record.career_suggestions.0,
            book_recommendations: record.book_recommendations.0,
            generated_at: Some(record.generated_at),
            from_cache,
            message: None,
        }
    }

    fn not_generated() -> Self {
        Self {
            feedback: None,
            career_suggestions: Vec::new(),
            book_recommendations: Vec::new(),
            generated_at: None,
            from_cache: false,
            message: Some(NOT_GENERATED_MESSAGE.to_string()),
        }
    }
}

/// Where the narrative sections of a report came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionSource {
    Model,
    Fallback,
}

/// Generates, caches and invalidates feedback reports
#[derive(Clone)]
pub struct FeedbackService {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl FeedbackService {
    /// `None` means every report uses the templated fallback
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Produces the narrative sections for `input`
    pub async fn generate_sections(&self, input: &FeedbackInput) -> (FeedbackSections, SectionSource) {
        let Some(provider) = &self.provider else {
            info!("No completion provider configured, using fallback feedback");
            return (fallback::default_sections(input), SectionSource::Fallback);
        };

        let prompt = prompts::build_feedback_prompt(input);

        match provider
            .complete(prompts::HR_CONSULTANT_SYSTEM_PROMPT, &prompt)
            .await
        {
            Ok(text) => {
                let sections = parser::parse_sections(&text);
                if sections.is_blank() {
                    warn!(
                        provider = provider.name(),
                        response_chars = text.chars().count(),
                        "Model response had no recognisable sections, using fallback feedback"
                    );
                    (fallback::default_sections(input), SectionSource::Fallback)
                } else {
                    (sections, SectionSource::Model)
                }
            }
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "Feedback generation failed, using fallback feedback");
                (fallback::default_sections(input), SectionSource::Fallback)
            }
        }
    }

    /// Produces a complete report for `input`
    pub async fn generate(&self, input: &FeedbackInput) -> (NewAiFeedback, SectionSource) {
        let (feedback_content, source) = self.generate_sections(input).await;

        let report = NewAiFeedback {
            feedback_content,
            career_suggestions: recommendations::career_suggestions(&input.competencies),
            book_recommendations: recommendations::book_recommendations(&input.competencies),
        };

        (report, source)
    }

    /// Serves the user's report according to the cache policy
    ///
    /// Without `force_regenerate`, a report younger than `validity` is
    /// returned from the cache and anything else yields an empty response
    /// carrying [`NOT_GENERATED_MESSAGE`]. With it, scores are recomputed, a
    /// new report is generated and stored, and returned with
    /// `from_cache = false`.
    ///
    /// # Errors
    ///
    /// `FeedbackError::NoResults` when regeneration is forced but the user
    /// has no scores yet.
    pub async fn get_feedback(
        &self,
        pool: &PgPool,
        user: &User,
        force_regenerate: bool,
        validity: Duration,
    ) -> Result<FeedbackResponse, FeedbackError> {
        if !force_regenerate {
            return match AiFeedback::find_fresh(pool, user.id, validity).await? {
                Some(record) => {
                    info!(user_id = %user.id, generated_at = %record.generated_at, "Serving cached feedback");
                    Ok(FeedbackResponse::from_record(record, true))
                }
                None => {
                    info!(user_id = %user.id, "No fresh feedback cached");
                    Ok(FeedbackResponse::not_generated())
                }
            };
        }

        let results = get_competency_results(pool, user.id).await?;
        if results.is_empty() {
            return Err(FeedbackError::NoResults);
        }

        let career_plan = UserCareerPlan::find_by_user(pool, user.id).await?;
        let input = FeedbackInput::from_results(user.name.clone(), &results, career_plan);

        let (report, source) = self.generate(&input).await;
        let record = AiFeedback::upsert(pool, user.id, report).await?;

        info!(
            user_id = %user.id,
            competencies = input.competencies.len(),
            source = ?source,
            "Feedback regenerated"
        );

        Ok(FeedbackResponse::from_record(record, false))
    }

    /// Drops the user's cached report
    pub async fn invalidate(&self, pool: &PgPool, user_id: Uuid) -> Result<bool, FeedbackError> {
        let removed = AiFeedback::invalidate(pool, user_id).await?;
        if removed {
            info!(%user_id, "Cached feedback invalidated");
        }
        Ok(removed)
    }
}

impl Default for FeedbackService {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Default validity as a duration
pub fn default_cache_validity() -> Duration {
    Duration::hours(DEFAULT_CACHE_VALIDITY_HOURS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm::LlmError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        reply: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(system.contains("senior HR consultant"));
            assert!(prompt.contains("STRENGTH_ANALYSIS:"));

            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    message: "unavailable".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn input() -> FeedbackInput {
        FeedbackInput {
            user_name: "Ren".to_string(),
            competencies: vec![
                CompetencySnapshot::new("Leadership", None, 4.5, Some(3.0)),
                CompetencySnapshot::new("Time Management", None, 2.0, Some(3.2)),
            ],
            career_plan: None,
        }
    }

    #[test]
    fn test_snapshot_gap_analysis() {
        let above = CompetencySnapshot::new("Leadership", None, 4.0, Some(3.5));
        assert_eq!(above.difference, Some(0.5));
        assert_eq!(above.gap_analysis, GAP_STRENGTH);

        let equal = CompetencySnapshot::new("Leadership", None, 3.5, Some(3.5));
        assert_eq!(equal.gap_analysis, GAP_NEEDS_IMPROVEMENT);

        let no_average = CompetencySnapshot::new("Leadership", None, 5.0, None);
        assert_eq!(no_average.difference, None);
        assert_eq!(no_average.gap_analysis, GAP_NEEDS_IMPROVEMENT);
    }

    #[tokio::test]
    async fn test_without_provider_uses_fallback() {
        let service = FeedbackService::default();
        assert!(!service.has_provider());

        let (sections, source) = service.generate_sections(&input()).await;

        assert_eq!(source, SectionSource::Fallback);
        assert_eq!(sections, fallback::default_sections(&input()));
    }

    #[tokio::test]
    async fn test_model_sections_used_when_parsable() {
        let provider = Arc::new(ScriptedProvider::replying(
            "STRENGTH_ANALYSIS:\nDecisive leader.\nOVERALL_STRATEGY:\nDelegate scheduling.",
        ));
        let service = FeedbackService::new(Some(provider.clone()));

        let (sections, source) = service.generate_sections(&input()).await;

        assert_eq!(source, SectionSource::Model);
        assert_eq!(sections.strengths, "Decisive leader.");
        assert_eq!(sections.overall, "Delegate scheduling.");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparsable_reply_falls_back() {
        let service = FeedbackService::new(Some(Arc::new(ScriptedProvider::replying(
            "I'm sorry, I can't do that.",
        ))));

        let (sections, source) = service.generate_sections(&input()).await;

        assert_eq!(source, SectionSource::Fallback);
        assert!(sections.strengths.contains("Leadership"));
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let service = FeedbackService::new(Some(Arc::new(ScriptedProvider::failing(500))));

        let (sections, source) = service.generate_sections(&input()).await;

        assert_eq!(source, SectionSource::Fallback);
        assert!(sections.improvements.contains("Time Management"));
    }

    #[tokio::test]
    async fn test_generate_includes_suggestions_and_books() {
        let (report, _) = FeedbackService::default().generate(&input()).await;

        assert!(report.career_suggestions.iter().any(|s| s.contains("team lead")));
        assert!(report.career_suggestions.iter().any(|s| s.contains("task management")));
        assert_eq!(report.book_recommendations.len(), 3);
        assert_eq!(report.book_recommendations[0].title, "Getting Things Done");
    }

    #[test]
    fn test_not_generated_response_shape() {
        let json = serde_json::to_value(FeedbackResponse::not_generated()).unwrap();

        assert!(json["feedback"].is_null());
        assert!(json["generated_at"].is_null());
        assert_eq!(json["from_cache"], false);
        assert_eq!(json["message"], NOT_GENERATED_MESSAGE);
        assert_eq!(json["career_suggestions"], serde_json::json!([]));
    }

    #[test]
    fn test_default_cache_validity() {
        assert_eq!(default_cache_validity(), Duration::hours(24));
    }
}
