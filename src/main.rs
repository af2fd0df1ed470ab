use alumni_mentoring::{
    db::{create_pool, run_migrations},
    notification::start_reminder_service,
    routes::create_router,
    state::{AppState, Config},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,alumni_mentoring=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    tracing::info!("Connecting to database...");
    let db = create_pool(&config.database_url, config.database_max_connections).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    let state = AppState::new(db, config.clone());

    // Keep the scheduler handle alive for the lifetime of the server
    let _reminders = start_reminder_service(state.clone())
        .await
        .map_err(|e| anyhow::anyhow!("failed to start reminder service: {}", e))?;

    let app = create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
