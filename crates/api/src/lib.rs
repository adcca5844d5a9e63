//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - Dashboard, sales-invoice and invoice-number routes
//! - The dashboard event stream
//! - Authentication middleware and the tenant extractor

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use finboard_core::sequence::InvoiceNumberAllocator;
use finboard_db::CounterSequenceAllocator;
use finboard_shared::{AppError, DashboardConfig, JwtService};

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Lazily connected pool; may be unreachable at any given moment.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Dashboard tuning.
    pub dashboard: Arc<DashboardConfig>,
    /// Invoice number strategy; degrades per call while the counter is unreachable.
    pub allocator: Arc<dyn InvoiceNumberAllocator>,
}

impl AppState {
    /// Builds the state around `db`.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService, dashboard: DashboardConfig) -> Self {
        Self {
            allocator: Arc::new(CounterSequenceAllocator::new(db.clone())),
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            dashboard: Arc::new(dashboard),
        }
    }

    /// The connection, or 503 when storage does not answer a ping.
    pub async fn require_storage(&self) -> Result<DatabaseConnection, ApiError> {
        match self.db.ping().await {
            Ok(()) => Ok(self.db.as_ref().clone()),
            Err(e) => {
                warn!(error = %e, "Storage unavailable");
                Err(ApiError(AppError::ServiceUnavailable(
                    "Storage is unavailable".to_string(),
                )))
            }
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
