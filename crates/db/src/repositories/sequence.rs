//! Invoice number sequencing backed by the per-year counter table.
//!
//! Allocation runs inside the caller's transaction: scan the highest numeric
//! suffix already issued for the year, then upsert the counter row. The row
//! lock taken by the upsert serializes writers until commit, and the
//! `invoice_number` unique constraint catches anything that slips past.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Set, SqlErr,
    Statement, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use finboard_core::sequence::{
    Allocation, AllocationMode, AttemptError, InvoiceNumber, InvoiceNumberAllocator,
    SequenceError, TimestampFallbackAllocator, with_single_bump,
};
use finboard_shared::OwnerId;

use super::RepositoryError;
use crate::entities::invoices;

const MAX_SUFFIX_SQL: &str = r"
SELECT COALESCE(MAX(CAST(SUBSTRING(invoice_number FROM $2) AS BIGINT)), 0) AS max_seq
FROM invoices
WHERE invoice_number LIKE $1
  AND SUBSTRING(invoice_number FROM $2) ~ '^[0-9]{1,18}$'
";

const UPSERT_COUNTER_SQL: &str = r"
INSERT INTO invoice_number_sequences (year, last_value)
VALUES ($1, $2)
ON CONFLICT (year) DO UPDATE
SET last_value = GREATEST(invoice_number_sequences.last_value + 1, EXCLUDED.last_value),
    updated_at = now()
RETURNING last_value
";

/// Input for creating an invoice with an allocated number.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Owning tenant.
    pub owner_id: OwnerId,
    /// Billed customer.
    pub customer_id: Uuid,
    /// Issue date; its year selects the sequence.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Amount already paid.
    pub paid_amount: Decimal,
    /// Lifecycle status.
    pub status: String,
}

/// Scan for the highest numeric suffix issued under `INV-{year}`.
///
/// `SUBSTRING .. FROM` is 1-based, so the suffix starts one past the prefix.
fn max_suffix_statement(year: i32) -> Statement {
    let prefix = InvoiceNumber::year_prefix(year);
    let suffix_from = i32::try_from(prefix.len() + 1).unwrap_or(i32::MAX);
    Statement::from_sql_and_values(
        DbBackend::Postgres,
        MAX_SUFFIX_SQL,
        [format!("{prefix}%").into(), suffix_from.into()],
    )
}

fn storage(err: DbErr) -> AttemptError {
    AttemptError::Failed(RepositoryError::from(err).into())
}

fn is_number_collision(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(msg)) if msg.contains("invoice_number")
    )
}

/// Invoice creation with transactional numbering.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reserves the next number for `year` on `conn`.
    ///
    /// The result is at least one above every issued suffix for the year and
    /// at least `floor`. Run it inside a transaction so the counter row stays
    /// locked until the invoice is written.
    pub async fn allocate_in<C: ConnectionTrait>(
        conn: &C,
        year: i32,
        floor: Option<u64>,
    ) -> Result<InvoiceNumber, DbErr> {
        let max_seq: i64 = match conn.query_one(max_suffix_statement(year)).await? {
            Some(row) => row.try_get("", "max_seq")?,
            None => 0,
        };

        let floor = floor.map_or(0, |f| i64::try_from(f).unwrap_or(i64::MAX));
        let seed = max_seq.saturating_add(1).max(floor);

        let upsert = Statement::from_sql_and_values(
            DbBackend::Postgres,
            UPSERT_COUNTER_SQL,
            [year.into(), seed.into()],
        );
        let last_value: i64 = conn
            .query_one(upsert)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("invoice_number_sequences".to_string()))?
            .try_get("", "last_value")?;

        Ok(InvoiceNumber::new(year, u64::try_from(last_value).unwrap_or(0)))
    }

    /// Inserts an invoice under a freshly allocated number.
    ///
    /// A unique violation on the number bumps the sequence and retries once.
    pub async fn create_invoice(&self, input: NewInvoice) -> Result<invoices::Model, SequenceError> {
        let year = input.issue_date.year();
        with_single_bump(|floor| {
            let input = input.clone();
            async move { self.try_create(input, year, floor).await }
        })
        .await
    }

    async fn try_create(
        &self,
        input: NewInvoice,
        year: i32,
        floor: Option<u64>,
    ) -> Result<invoices::Model, AttemptError> {
        let txn = self.db.begin().await.map_err(storage)?;
        let number = Self::allocate_in(&txn, year, floor)
            .await
            .map_err(storage)?;

        let inserted = invoices::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(input.owner_id.into_inner()),
            customer_id: Set(input.customer_id),
            invoice_number: Set(number.to_string()),
            issue_date: Set(input.issue_date),
            due_date: Set(input.due_date),
            total_amount: Set(input.total_amount),
            paid_amount: Set(input.paid_amount),
            status: Set(input.status),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await;

        let invoice = match inserted {
            Ok(invoice) => invoice,
            Err(err) if is_number_collision(&err) => {
                return Err(AttemptError::Collision { number });
            }
            Err(err) => return Err(storage(err)),
        };

        txn.commit().await.map_err(storage)?;

        info!(
            owner_id = %input.owner_id,
            invoice_number = %invoice.invoice_number,
            "Invoice created"
        );
        Ok(invoice)
    }
}

// ============================================================================
// Allocators
// ============================================================================

/// Counter-backed allocator.
///
/// Falls back to [`TimestampFallbackAllocator`] when no connection can be
/// obtained.
#[derive(Debug, Clone)]
pub struct CounterSequenceAllocator {
    db: DatabaseConnection,
}

impl CounterSequenceAllocator {
    /// Creates an allocator over `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn reserve(&self, year: i32) -> Result<InvoiceNumber, DbErr> {
        let txn = self.db.begin().await?;
        let number = SequenceRepository::allocate_in(&txn, year, None).await?;
        txn.commit().await?;
        Ok(number)
    }
}

#[async_trait]
impl InvoiceNumberAllocator for CounterSequenceAllocator {
    async fn next(&self, issue_date: NaiveDate) -> Result<Allocation, SequenceError> {
        match self.reserve(issue_date.year()).await {
            Ok(invoice_number) => Ok(Allocation {
                invoice_number,
                mode: AllocationMode::Sequential,
            }),
            Err(err @ (DbErr::Conn(_) | DbErr::ConnectionAcquire(_))) => {
                warn!(error = %err, "Sequence counter unreachable");
                TimestampFallbackAllocator.next(issue_date).await
            }
            Err(err) => Err(RepositoryError::from(err).into()),
        }
    }
}
