/// Bearer token authentication for Axum
///
/// Credentials are read from the `Authorization: Bearer <token>` header, the
/// token is validated, and the user named by its subject is loaded. Handlers
/// behind the middleware receive that [`User`] through request extensions.
///
/// # Example
///
/// ```no_run
/// use axum::{extract::{Request, State}, middleware::{self, Next}, routing::get, Extension, Router};
/// use competency_shared::auth::middleware::{jwt_auth_middleware, AuthError};
/// use competency_shared::models::user::User;
/// use sqlx::PgPool;
///
/// async fn me(Extension(user): Extension<User>) -> String {
///     format!("Hello, {}!", user.name)
/// }
///
/// async fn auth(
///     State(pool): State<PgPool>,
///     req: Request,
///     next: Next,
/// ) -> Result<axum::response::Response, AuthError> {
///     jwt_auth_middleware(pool, "your-jwt-secret".to_string(), req, next).await
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/me", get(me))
///         .layer(middleware::from_fn_with_state(pool, auth))
/// }
/// ```

use axum::{middleware, routing::get, Extension, Router};
/// use competency_shared::auth::middleware::create_jwt_middleware;
/// use competency_shared::models::user::User;
/// use sqlx::PgPool;
///
/// async fn me(Extension(user): Extension<User>) -> String {
///     format!("Hello, {}!", user.name)
/// }
///
/// fn router(pool: PgPool) -> Router {
///     Router::new()
///         .route("/me", get(me))
///         .layer(middleware::from_fn(create_jwt_middleware(pool, "your-jwt-secret")))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sqlx::PgPool;
use tracing::{debug, warn};

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Not authenticated")]
    MissingCredentials,

    /// Authorization header present but not a bearer credential
    #[error("{0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("{0}")]
    InvalidToken(String),

    /// Token subject does not name an existing user
    #[error("User not found")]
    UnknownUser,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidToken(_)
            | AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat(_) | AuthError::InactiveUser => StatusCode::BAD_REQUEST,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            other => (other.status_code(), other.to_string()).into_response(),
        }
    }
}

/// Extracts the bearer token from request headers
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    match auth_header.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidFormat("Expected Bearer token".to_string())),
    }
}

/// Resolves a bearer token to an active user
///
/// # Errors
///
/// - `InvalidToken` if the signature, expiry or issuer check fails
/// - `UnknownUser` if the subject no longer exists
/// - `InactiveUser` if the account is deactivated
pub async fn authenticate(pool: &PgPool, secret: &str, token: &str) -> Result<User, AuthError> {
    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Could not validate credentials".to_string()),
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "Token subject not found");
            AuthError::UnknownUser
        })?;

    if !user.is_active {
        debug!(user_id = %user.id, "Rejected inactive user");
        return Err(AuthError::InactiveUser);
    }

    Ok(user)
}

/// JWT authentication middleware
///
/// Inserts the authenticated [`User`] into request extensions.
pub async fn jwt_auth_middleware(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?.to_string();
    let user = authenticate(&pool, &secret, &token).await?;

    debug!(user_id = %user.id, "Authenticated request");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
