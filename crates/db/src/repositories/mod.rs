//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod metrics;
pub mod sales_invoice;
pub mod sequence;

pub use metrics::MetricsRepository;
pub use sales_invoice::SalesInvoiceRepository;
pub use sequence::{CounterSequenceAllocator, NewInvoice, SequenceRepository};

use finboard_core::dashboard::MetricsError;
use finboard_core::sequence::SequenceError;
use sea_orm::DbErr;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RepositoryError> for MetricsError {
    fn from(err: RepositoryError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<RepositoryError> for SequenceError {
    fn from(err: RepositoryError) -> Self {
        Self::Storage(err.to_string())
    }
}
