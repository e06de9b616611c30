/// Question endpoints
///
/// - `GET /api/v1/questions` - Questions with their competency item
/// - `GET /api/v1/questions/with-answers` - Questions with the caller's score
/// - `GET /api/v1/questions/:question_id` - One question

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use competency_shared::models::{
    competency_item::CompetencyItem,
    question::{Question, QuestionWithAnswer, QuestionWithCompetency},
    user::User,
};
use uuid::Uuid;

pub async fn list_questions(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<QuestionWithCompetency>>> {
    let (limit, offset) = page.bounds()?;

    Ok(Json(Question::list_with_competency(&state.db, limit, offset).await?))
}

/// Every question, with `user_answer` set where the caller has answered
pub async fn list_with_answers(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> ApiResult<Json<Vec<QuestionWithAnswer>>> {
    Ok(Json(Question::list_with_user_answers(&state.db, caller.id).await?))
}

pub async fn read_question(
    State(state): State<AppState>,
    Path(question_id): Path<Uuid>,
) -> ApiResult<Json<QuestionWithCompetency>> {
    let not_found = || ApiError::NotFound("Question not found".to_string());

    let question = Question::find_by_id(&state.db, question_id)
        .await?
        .ok_or_else(not_found)?;
    let competency_item = CompetencyItem::find_by_id(&state.db, question.competency_item_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(QuestionWithCompetency {
        question,
        competency_item,
    }))
}
