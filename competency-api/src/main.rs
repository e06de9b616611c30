//! # Competency API Server
//!
//! Serves the self-evaluation API: accounts, questionnaire answers,
//! competency scores, career plans and AI feedback.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/competency JWT_SECRET=... cargo run -p competency-api
//! ```
//!
//! Pending migrations are applied on startup. Seed the competency catalogue
//! with `competency-admin seed`.

use competency_api::{
    app::{build_feedback_service, build_router, AppState},
    config::Config,
};
use competency_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "competency_api=debug,competency_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Competency API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let feedback = build_feedback_service(&config)?;
    let address = config.bind_address();
    let state = AppState::new(pool.clone(), config).with_feedback_service(feedback);
    let app = build_router(state);

    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    close_pool(pool).await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
