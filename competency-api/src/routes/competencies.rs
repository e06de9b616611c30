/// Competency endpoints
///
/// - `GET /api/v1/competencies/items` - Items with their questions
/// - `GET /api/v1/competencies/results` - The caller's scores and company averages
/// - `GET /api/v1/competencies/feedback` - AI feedback report

use crate::{app::AppState, error::ApiResult, routes::Pagination};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use competency_shared::{
    feedback::FeedbackResponse,
    models::{
        competency_item::{CompetencyItem, CompetencyItemWithQuestions},
        user::User,
    },
    scoring::{get_competency_results, CompetencyResults},
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    #[serde(default)]
    pub force_regenerate: bool,
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<CompetencyItemWithQuestions>>> {
    let (limit, offset) = page.bounds()?;

    Ok(Json(CompetencyItem::list_with_questions(&state.db, limit, offset).await?))
}

/// Recomputes and returns the caller's results
pub async fn read_results(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> ApiResult<Json<CompetencyResults>> {
    Ok(Json(get_competency_results(&state.db, caller.id).await?))
}

/// AI feedback
///
/// # Endpoint
///
/// ```text
/// GET /api/v1/competencies/feedback?force_regenerate=true
/// ```
///
/// Without `force_regenerate` only a cached report younger than the
/// configured validity is returned; otherwise `feedback` is null and
/// `message` explains how to generate one. With it, a new report is
/// generated and cached.
///
/// # Errors
///
/// - `400 Bad Request`: Regeneration requested before any answers exist
pub async fn read_feedback(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Query(query): Query<FeedbackQuery>,
) -> ApiResult<Json<FeedbackResponse>> {
    let report = state
        .feedback
        .get_feedback(
            &state.db,
            &caller,
            query.force_regenerate,
            state.config.feedback_cache_validity(),
        )
        .await?;

    Ok(Json(report))
}
