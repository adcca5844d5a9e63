//! Finboard API Server
//!
//! Main entry point for the dashboard backend service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finboard_api::{AppState, create_router};
use finboard_db::connect_with;
use finboard_shared::{AppConfig, JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    // The pool connects lazily; dashboards answer 503 and numbering degrades
    // until storage is reachable.
    let db = connect_with(&config.database)
        .await
        .context("Invalid database configuration")?;
    match db.ping().await {
        Ok(()) => info!("Connected to database"),
        Err(e) => warn!(error = %e, "Database unavailable, serving in degraded mode"),
    }

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        ..JwtConfig::default()
    });

    let state = AppState::new(db, jwt_service, config.dashboard.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
