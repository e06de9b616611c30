/// Career plan endpoints
///
/// Every route acts on the caller's own plan.
///
/// - `GET /api/v1/career-plans`
/// - `POST /api/v1/career-plans` - Create (fails if one exists)
/// - `PUT /api/v1/career-plans` - Update provided fields, creating the plan if missing
/// - `DELETE /api/v1/career-plans`
///
/// Request bodies are [`CareerPlanFields`]; every field is optional.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use competency_shared::models::{
    career_plan::{CareerPlanFields, UserCareerPlan},
    user::User,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Career plan not found".to_string())
}

pub async fn read_plan(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> ApiResult<Json<UserCareerPlan>> {
    let plan = UserCareerPlan::find_by_user(&state.db, caller.id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(plan))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(fields): Json<CareerPlanFields>,
) -> ApiResult<Json<UserCareerPlan>> {
    fields.validate()?;

    if UserCareerPlan::find_by_user(&state.db, caller.id).await?.is_some() {
        return Err(ApiError::BadRequest(
            "Career plan already exists. Use PUT to update.".to_string(),
        ));
    }

    let plan = UserCareerPlan::create_for_user(&state.db, caller.id, fields).await?;

    tracing::info!(user_id = %caller.id, "Career plan created");
    Ok(Json(plan))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(fields): Json<CareerPlanFields>,
) -> ApiResult<Json<UserCareerPlan>> {
    fields.validate()?;

    let plan = match UserCareerPlan::update_for_user(&state.db, caller.id, fields.clone()).await? {
        Some(plan) => plan,
        None => {
            tracing::debug!(user_id = %caller.id, "No career plan to update, creating one");
            UserCareerPlan::create_for_user(&state.db, caller.id, fields).await?
        }
    };

    Ok(Json(plan))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
) -> ApiResult<Json<MessageResponse>> {
    if !UserCareerPlan::delete_for_user(&state.db, caller.id).await? {
        return Err(not_found());
    }

    Ok(Json(MessageResponse {
        message: "Career plan deleted successfully".to_string(),
    }))
}
