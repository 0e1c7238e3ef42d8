//! dollarsandlife - content backend for the Dollars & Life site

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dollarsandlife::{
    api::{self, AppState},
    config::Config,
    db::{self, repositories::SqlxRecordRepository},
    services::RecordService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dollarsandlife=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting dollarsandlife...");

    // Load configuration
    let config_path = Config::path_from_env();
    let config = Config::load_with_env(&config_path)?;
    tracing::info!("Configuration loaded from {}", config_path.display());

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let budget_posts = RecordService::new(SqlxRecordRepository::boxed(pool.clone()));
    let state = AppState::new(pool, budget_posts).with_rate_limits(&config.rate_limit);

    // Forget idle clients once per window
    for limiter in [state.list_limiter.clone(), state.item_limiter.clone()]
        .into_iter()
        .flatten()
    {
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(tokio::time::Duration::from_secs(limiter.window_secs()));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
