//! Invoice number allocation strategies.

use std::future::Future;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use super::number::InvoiceNumber;

/// Allocation failures.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The bumped retry collided as well.
    #[error("Invoice number {number} is already taken")]
    Collision {
        /// The number that collided on retry.
        number: String,
    },

    /// The backing store failed.
    #[error("Sequence storage error: {0}")]
    Storage(String),
}

/// How a number was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// From the transactional per-year counter.
    Sequential,
    /// From the clock; uniqueness is probabilistic.
    Degraded,
}

/// An allocated number and the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// The number.
    pub invoice_number: InvoiceNumber,
    /// Strategy used.
    pub mode: AllocationMode,
}

/// Hands out invoice numbers.
#[async_trait]
pub trait InvoiceNumberAllocator: Send + Sync {
    /// Next number for an invoice issued on `issue_date`.
    async fn next(&self, issue_date: NaiveDate) -> Result<Allocation, SequenceError>;
}

/// Clock-based numbers for when no counter is reachable.
///
/// The sequence is the last four digits of the epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFallbackAllocator;

impl TimestampFallbackAllocator {
    /// Number for `issue_date` at `epoch_millis`.
    #[must_use]
    pub fn number_at(issue_date: NaiveDate, epoch_millis: i64) -> InvoiceNumber {
        let suffix = epoch_millis.rem_euclid(10_000).unsigned_abs();
        InvoiceNumber::new(issue_date.year(), suffix)
    }
}

#[async_trait]
impl InvoiceNumberAllocator for TimestampFallbackAllocator {
    async fn next(&self, issue_date: NaiveDate) -> Result<Allocation, SequenceError> {
        let invoice_number = Self::number_at(issue_date, Utc::now().timestamp_millis());
        warn!(
            invoice_number = %invoice_number,
            "Sequence allocation degraded to timestamp fallback"
        );
        Ok(Allocation {
            invoice_number,
            mode: AllocationMode::Degraded,
        })
    }
}

/// Outcome of one allocate-and-insert attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// The unique constraint rejected this number.
    Collision {
        /// The rejected number.
        number: InvoiceNumber,
    },
    /// Any other failure; not retried.
    Failed(SequenceError),
}

impl From<SequenceError> for AttemptError {
    fn from(err: SequenceError) -> Self {
        Self::Failed(err)
    }
}

/// Runs `attempt`, retrying exactly once after a collision.
///
/// The first call gets no floor. After a collision on sequence `n` the retry
/// gets floor `n + 1`; a second collision is reported as
/// [`SequenceError::Collision`].
///
/// # Errors
///
/// Returns the attempt's own error, or `Collision` when the retry collides.
pub async fn with_single_bump<T, F, Fut>(mut attempt: F) -> Result<T, SequenceError>
where
    F: FnMut(Option<u64>) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let collided = match attempt(None).await {
        Ok(value) => return Ok(value),
        Err(AttemptError::Failed(err)) => return Err(err),
        Err(AttemptError::Collision { number }) => number,
    };

    warn!(
        invoice_number = %collided,
        "Invoice number collision, retrying with bumped sequence"
    );

    match attempt(Some(collided.bumped().sequence())).await {
        Ok(value) => Ok(value),
        Err(AttemptError::Failed(err)) => Err(err),
        Err(AttemptError::Collision { number }) => Err(SequenceError::Collision {
            number: number.to_string(),
        }),
    }
}
