//! Learnboard API Server

use processor::{GlobalScoreCalculator, RecalcConfig, RecalcService};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod error;
mod routes;
mod state;

#[cfg(test)]
mod routes_test;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api=debug".parse()?)
                .add_directive("processor=info".parse()?)
                .add_directive("db=info".parse()?),
        )
        .init();

    info!("🎓 Starting Learnboard API");

    // Load configuration
    let config = common::Config::from_env();

    // Connect to database
    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Start background recalculation (if enabled)
    match RecalcConfig::from_hours(config.recalc_interval_hours) {
        Some(recalc_config) => {
            let global_calculator = GlobalScoreCalculator::new(
                pool.clone(),
                chrono::Duration::hours(config.score_staleness_hours as i64),
            );
            let service = RecalcService::new(pool.clone(), global_calculator, recalc_config);
            tokio::spawn(async move {
                service.run().await;
            });
            info!(
                "🔁 Background recalculation enabled (every {} hours)",
                config.recalc_interval_hours
            );
        }
        None => info!("🔁 Background recalculation disabled (RECALC_INTERVAL_HOURS=0)"),
    }

    // Create app state
    let state = Arc::new(AppState::new(&config, pool));

    let app = routes::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("🚀 Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
