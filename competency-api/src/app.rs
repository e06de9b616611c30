/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use competency_api::{app::{build_feedback_service, build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let feedback = build_feedback_service(&config)?;
/// let state = AppState::new(pool, config).with_feedback_service(feedback);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use competency_shared::{
    auth::middleware::jwt_auth_middleware,
    feedback::{
        llm::{LlmConfig, OpenAiClient},
        FeedbackService,
    },
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Feedback generation and caching
    pub feedback: FeedbackService,
}

impl AppState {
    /// Creates state whose feedback always uses the templated fallback
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            feedback: FeedbackService::default(),
        }
    }

    pub fn with_feedback_service(mut self, feedback: FeedbackService) -> Self {
        self.feedback = feedback;
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the feedback service described by `config`
///
/// Without `OPENAI_API_KEY` the service has no provider and every report is
/// templated.
pub fn build_feedback_service(config: &Config) -> anyhow::Result<FeedbackService> {
    let Some(api_key) = &config.llm.api_key else {
        tracing::warn!("OPENAI_API_KEY not set, feedback will use templated fallback text");
        return Ok(FeedbackService::new(None));
    };

    let mut llm_config = LlmConfig::new(api_key.clone());
    llm_config.base_url = config.llm.base_url.clone();
    llm_config.model = config.llm.model.clone();

    tracing::info!(model = %llm_config.model, base_url = %llm_config.base_url, "Completion provider configured");

    Ok(FeedbackService::new(Some(Arc::new(OpenAiClient::new(llm_config)?))))
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/v1/
///     ├── /auth/                       # Public
///     │   ├── POST /register
///     │   └── POST /login
///     ├── /users/                      # Authenticated
///     │   ├── GET, POST  /
///     │   ├── GET, PUT   /me
///     │   └── GET, DELETE /:user_id
///     ├── /questions/                  # Authenticated
///     │   ├── GET /
///     │   ├── GET /with-answers
///     │   └── GET /:question_id
///     ├── /answers/                    # Authenticated
///     │   └── GET, POST /
///     ├── /competencies/               # Authenticated
///     │   ├── GET /items
///     │   ├── GET /results
///     │   └── GET /feedback
///     └── /career-plans/               # Authenticated
///         └── GET, POST, PUT, DELETE /
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", axum::routing::post(routes::auth::register))
        .route("/login", axum::routing::post(routes::auth::login));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route("/me", get(routes::users::read_me).put(routes::users::update_me))
        .route(
            "/:user_id",
            get(routes::users::read_user).delete(routes::users::delete_user),
        );

    let question_routes = Router::new()
        .route("/", get(routes::questions::list_questions))
        .route("/with-answers", get(routes::questions::list_with_answers))
        .route("/:question_id", get(routes::questions::read_question));

    let answer_routes = Router::new().route(
        "/",
        get(routes::answers::list_answers).post(routes::answers::submit_answers),
    );

    let competency_routes = Router::new()
        .route("/items", get(routes::competencies::list_items))
        .route("/results", get(routes::competencies::read_results))
        .route("/feedback", get(routes::competencies::read_feedback));

    let career_plan_routes = Router::new().route(
        "/",
        get(routes::career_plans::read_plan)
            .post(routes::career_plans::create_plan)
            .put(routes::career_plans::update_plan)
            .delete(routes::career_plans::delete_plan),
    );

    // Everything except auth requires a bearer token
    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/questions", question_routes)
        .nest("/answers", answer_routes)
        .nest("/competencies", competency_routes)
        .nest("/career-plans", career_plan_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Bearer token authentication layer
///
/// Resolves the token to an active user and inserts the `User` into request
/// extensions for `Extension<User>` extractors.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    jwt_auth_middleware(state.db.clone(), state.config.jwt.secret.clone(), req, next)
        .await
        .map_err(ApiError::from)
}
