/// User endpoints
///
/// - `GET /api/v1/users` - List users (superuser)
/// - `POST /api/v1/users` - Create a user (superuser)
/// - `GET /api/v1/users/me` - Current user
/// - `PUT /api/v1/users/me` - Update current user
/// - `GET /api/v1/users/:user_id` - One user (self or superuser)
/// - `DELETE /api/v1/users/:user_id` - Delete a user (superuser)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use competency_shared::{
    auth::{
        authorization::{require_self_or_superuser, require_superuser},
        password,
    },
    models::user::{CreateUser, UpdateUser, User},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Superuser request to create an account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,

    #[validate(length(max = 100, message = "Position must be at most 100 characters"))]
    pub position: Option<String>,

    #[serde(default)]
    pub is_superuser: bool,
}

/// Self-service update; omitted fields are left alone
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMeRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 100, message = "Department must be at most 100 characters"))]
    pub department: Option<String>,

    #[validate(length(max = 100, message = "Position must be at most 100 characters"))]
    pub position: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<User>>> {
    require_superuser(&caller)?;
    let (limit, offset) = page.bounds()?;

    Ok(Json(User::list(&state.db, limit, offset).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<User>> {
    require_superuser(&caller)?;
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(|e| ApiError::invalid("password", e))?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.trim().to_lowercase(),
            password_hash: password::hash_password(&req.password)?,
            name: req.name.trim().to_string(),
            department: req.department,
            position: req.position,
            is_superuser: req.is_superuser,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, created_by = %caller.id, is_superuser = user.is_superuser, "User created");
    Ok(Json(user))
}

pub async fn read_me(Extension(caller): Extension<User>) -> Json<User> {
    Json(caller)
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let password_hash = match &req.password {
        Some(new_password) => {
            password::validate_password_strength(new_password)
                .map_err(|e| ApiError::invalid("password", e))?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let update = UpdateUser {
        email: req.email.map(|e| e.trim().to_lowercase()),
        password_hash,
        name: req.name.map(|n| n.trim().to_string()),
        department: req.department.map(Some),
        position: req.position.map(Some),
        ..Default::default()
    };

    if update.is_empty() {
        return Ok(Json(caller));
    }

    let user = User::update(&state.db, caller.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

pub async fn read_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    require_self_or_superuser(&caller, user_id)?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("The user with this id does not exist".to_string()))?;

    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<User>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_superuser(&caller)?;

    if !User::delete(&state.db, user_id).await? {
        return Err(ApiError::NotFound("The user with this id does not exist".to_string()));
    }

    tracing::info!(%user_id, deleted_by = %caller.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
