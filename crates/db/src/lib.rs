//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Tenant-scoped query builders
//! - Repositories implementing the core metric and sequence seams
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;
pub mod scoped;

pub use repositories::{
    CounterSequenceAllocator, MetricsRepository, NewInvoice, RepositoryError,
    SalesInvoiceRepository, SequenceRepository,
};
pub use scoped::ScopedStore;

use std::time::Duration;

use finboard_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Builds a lazily connected pool using the configured limits.
///
/// Connections are opened on first use, so a server that is down now
/// surfaces as per-query errors and the pool recovers once it is back.
///
/// # Errors
///
/// Returns an error if the options are invalid (e.g. a malformed URL).
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(true);
    Database::connect(options).await
}
