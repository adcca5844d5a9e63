//! Receivables metrics repository.
//!
//! Backs the dashboard assembler. All reads go through the tenant's
//! [`ScopedStore`]; money stays `NUMERIC` in SQL and `Decimal` in Rust.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, FromQueryResult, JoinType, Order, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use finboard_core::TenantContext;
use finboard_core::dashboard::{
    AgingBucket, AgingBucketCalculator, AgingWindow, BaseKpis, CashInflowPoint,
    CustomerOutstanding, MetricsError, MetricsSource, MonthWindow, OverdueCustomer,
    Reconciliation, RecentInvoice, RegionalBreakup, TrendPoint, TrendSeriesBuilder,
};

use super::RepositoryError;
use crate::entities::{customers, invoices, payments};
use crate::scoped::{ScopedStore, col, count_all, open_balance, outstanding, overdue, sum_or_zero};

const UNKNOWN_CUSTOMER: &str = "Unknown";
const UNASSIGNED_REGION: &str = "Unassigned";

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, Default, FromQueryResult)]
struct InvoiceTotalsRow {
    invoice_count: i64,
    total_amount: Decimal,
    paid_amount: Decimal,
}

#[derive(Debug, Default, FromQueryResult)]
struct SumRow {
    total: Decimal,
}

#[derive(Debug, Default, FromQueryResult)]
struct BucketRow {
    amount: Decimal,
    count: i64,
}

#[derive(Debug, Default, FromQueryResult)]
struct MonthRow {
    sales: Decimal,
    balance_due: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct RecentInvoiceRow {
    id: Uuid,
    invoice_number: String,
    customer_name: Option<String>,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    total_amount: Decimal,
    paid_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl From<RecentInvoiceRow> for RecentInvoice {
    fn from(row: RecentInvoiceRow) -> Self {
        Self {
            id: row.id,
            invoice_number: row.invoice_number,
            customer_name: row.customer_name,
            issue_date: row.issue_date,
            due_date: row.due_date,
            total_amount: row.total_amount,
            paid_amount: row.paid_amount,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CustomerOutstandingRow {
    customer_id: Uuid,
    customer_name: Option<String>,
    invoice_count: i64,
    outstanding: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct OverdueCustomerRow {
    customer_id: Uuid,
    customer_name: Option<String>,
    overdue_count: i64,
    overdue_amount: Decimal,
    oldest_due_date: Option<NaiveDate>,
}

#[derive(Debug, FromQueryResult)]
struct RegionRow {
    region: Option<String>,
    invoice_count: i64,
    total_amount: Decimal,
    outstanding: Decimal,
}

fn to_i64(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Payments dated inside `window`; later-dated payments are excluded.
fn paid_within(select: Select<payments::Entity>, window: &MonthWindow) -> Select<payments::Entity> {
    select
        .filter(payments::Column::PaymentDate.gte(window.start))
        .filter(payments::Column::PaymentDate.lt(window.end_exclusive))
}

fn total_of(column: invoices::Column) -> SimpleExpr {
    sum_or_zero(col(invoices::Entity, column))
}

// ============================================================================
// Repository
// ============================================================================

/// Dashboard metrics for one tenant.
#[derive(Debug, Clone)]
pub struct MetricsRepository {
    store: ScopedStore,
    ctx: TenantContext,
}

impl MetricsRepository {
    /// Creates a repository bound to the tenant in `ctx`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, ctx: TenantContext) -> Self {
        Self {
            store: ScopedStore::new(db, ctx.owner_id()),
            ctx,
        }
    }

    /// Restricts invoices to the filter's issue-date range, if any.
    fn in_range(&self, select: Select<invoices::Entity>) -> Select<invoices::Entity> {
        match self.ctx.filter().range {
            Some(range) => select.filter(
                invoices::Column::IssueDate.between(range.start_date(), range.end_date()),
            ),
            None => select,
        }
    }

    async fn query_kpis(&self) -> Result<BaseKpis, RepositoryError> {
        let today = self.ctx.today();
        let this_month = MonthWindow::starting(today.with_day(1).unwrap_or(today));

        let totals = self
            .store
            .invoices()
            .refine(|q| {
                self.in_range(q)
                    .select_only()
                    .column_as(count_all(), "invoice_count")
                    .column_as(total_of(invoices::Column::TotalAmount), "total_amount")
                    .column_as(total_of(invoices::Column::PaidAmount), "paid_amount")
            })
            .one_as::<InvoiceTotalsRow>();
        let customer_count = self.store.customers().count();
        let overdue_count = self
            .store
            .invoices()
            .refine(|q| self.in_range(q).filter(overdue(today)))
            .count();
        let collected = self
            .store
            .payments()
            .refine(|q| {
                paid_within(q, &this_month)
                    .select_only()
                    .column_as(sum_or_zero(col(payments::Entity, payments::Column::Amount)), "total")
            })
            .one_as::<SumRow>();

        let (totals, customer_count, overdue_count, collected) =
            tokio::try_join!(totals, customer_count, overdue_count, collected)?;
        let totals = totals.unwrap_or_default();

        Ok(BaseKpis {
            customer_count: to_i64(customer_count),
            invoice_count: totals.invoice_count,
            outstanding_total: (totals.total_amount - totals.paid_amount).max(Decimal::ZERO),
            overdue_count: to_i64(overdue_count),
            collected_this_month: collected.unwrap_or_default().total,
            total_invoice_amount: totals.total_amount,
        })
    }

    async fn query_recent_invoices(&self, limit: u64) -> Result<Vec<RecentInvoice>, RepositoryError> {
        let rows = self
            .store
            .invoices()
            .refine(|q| {
                q.select_only()
                    .columns([
                        invoices::Column::Id,
                        invoices::Column::InvoiceNumber,
                        invoices::Column::IssueDate,
                        invoices::Column::DueDate,
                        invoices::Column::TotalAmount,
                        invoices::Column::PaidAmount,
                        invoices::Column::Status,
                        invoices::Column::CreatedAt,
                    ])
                    .column_as(customers::Column::CompanyName, "customer_name")
                    .join(JoinType::LeftJoin, invoices::Relation::Customers.def())
                    .order_by_desc(invoices::Column::CreatedAt)
                    .limit(limit)
            })
            .all_as::<RecentInvoiceRow>()
            .await?;

        Ok(rows.into_iter().map(RecentInvoice::from).collect())
    }

    async fn query_top_customers(&self, limit: u64) -> Result<Vec<CustomerOutstanding>, RepositoryError> {
        let rows = self
            .store
            .invoices()
            .refine(|q| {
                q.filter(open_balance())
                    .select_only()
                    .column_as(invoices::Column::CustomerId, "customer_id")
                    .column_as(customers::Column::CompanyName, "customer_name")
                    .column_as(count_all(), "invoice_count")
                    .column_as(sum_or_zero(outstanding()), "outstanding")
                    .join(JoinType::LeftJoin, invoices::Relation::Customers.def())
                    .group_by(invoices::Column::CustomerId)
                    .group_by(customers::Column::CompanyName)
                    .order_by(sum_or_zero(outstanding()), Order::Desc)
                    .limit(limit)
            })
            .all_as::<CustomerOutstandingRow>()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| CustomerOutstanding {
                customer_id: row.customer_id,
                customer_name: row
                    .customer_name
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
                invoice_count: row.invoice_count,
                outstanding: row.outstanding,
            })
            .collect())
    }

    async fn query_has_data(&self) -> Result<bool, RepositoryError> {
        let (customers, invoices, payments) = tokio::try_join!(
            self.store.customers().count(),
            self.store.invoices().count(),
            self.store.payments().count(),
        )?;
        Ok(customers + invoices + payments > 0)
    }

    async fn aging_bucket(&self, window: AgingWindow) -> Result<AgingBucket, RepositoryError> {
        let row = self
            .store
            .invoices()
            .refine(|q| {
                let q = q
                    .filter(open_balance())
                    .filter(invoices::Column::DueDate.lt(window.until));
                let q = match window.from {
                    Some(from) => q.filter(invoices::Column::DueDate.gte(from)),
                    None => q,
                };
                q.select_only()
                    .column_as(sum_or_zero(outstanding()), "amount")
                    .column_as(count_all(), "count")
            })
            .one_as::<BucketRow>()
            .await?
            .unwrap_or_default();

        Ok(AgingBucket {
            label: window.label,
            amount: row.amount,
            count: row.count,
        })
    }

    async fn query_regional(&self) -> Result<Vec<RegionalBreakup>, RepositoryError> {
        let rows = self
            .store
            .invoices()
            .refine(|q| {
                self.in_range(q)
                    .select_only()
                    .column_as(customers::Column::Region, "region")
                    .column_as(count_all(), "invoice_count")
                    .column_as(total_of(invoices::Column::TotalAmount), "total_amount")
                    .column_as(sum_or_zero(outstanding()), "outstanding")
                    .join(JoinType::LeftJoin, invoices::Relation::Customers.def())
                    .group_by(customers::Column::Region)
                    .order_by_asc(customers::Column::Region)
            })
            .all_as::<RegionRow>()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| RegionalBreakup {
                region: row.region.unwrap_or_else(|| UNASSIGNED_REGION.to_string()),
                invoice_count: row.invoice_count,
                total_amount: row.total_amount,
                outstanding: row.outstanding,
            })
            .collect())
    }

    async fn trend_point(&self, window: &MonthWindow) -> Result<TrendPoint, RepositoryError> {
        let row = self
            .store
            .invoices()
            .refine(|q| {
                q.filter(invoices::Column::IssueDate.gte(window.start))
                    .filter(invoices::Column::IssueDate.lt(window.end_exclusive))
                    .select_only()
                    .column_as(total_of(invoices::Column::TotalAmount), "sales")
                    .column_as(
                        sum_or_zero(
                            col(invoices::Entity, invoices::Column::TotalAmount)
                                .sub(col(invoices::Entity, invoices::Column::PaidAmount)),
                        ),
                        "balance_due",
                    )
            })
            .one_as::<MonthRow>()
            .await?
            .unwrap_or_default();

        Ok(TrendPoint {
            month: window.label.clone(),
            sales: row.sales,
            balance_due: row.balance_due,
        })
    }

    async fn query_top_overdue(&self, limit: u64) -> Result<Vec<OverdueCustomer>, RepositoryError> {
        let today = self.ctx.today();
        let rows = self
            .store
            .invoices()
            .refine(|q| {
                q.filter(overdue(today))
                    .select_only()
                    .column_as(invoices::Column::CustomerId, "customer_id")
                    .column_as(customers::Column::CompanyName, "customer_name")
                    .column_as(count_all(), "overdue_count")
                    .column_as(sum_or_zero(outstanding()), "overdue_amount")
                    .column_as(
                        SimpleExpr::from(Func::min(col(invoices::Entity, invoices::Column::DueDate))),
                        "oldest_due_date",
                    )
                    .join(JoinType::LeftJoin, invoices::Relation::Customers.def())
                    .group_by(invoices::Column::CustomerId)
                    .group_by(customers::Column::CompanyName)
                    .order_by(sum_or_zero(outstanding()), Order::Desc)
                    .limit(limit)
            })
            .all_as::<OverdueCustomerRow>()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| OverdueCustomer {
                customer_id: row.customer_id,
                customer_name: row
                    .customer_name
                    .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
                overdue_count: row.overdue_count,
                overdue_amount: row.overdue_amount,
                oldest_due_date: row.oldest_due_date,
            })
            .collect())
    }

    async fn cash_point(&self, window: &MonthWindow) -> Result<CashInflowPoint, RepositoryError> {
        let actual = self
            .store
            .payments()
            .refine(|q| {
                paid_within(q, window)
                    .select_only()
                    .column_as(sum_or_zero(col(payments::Entity, payments::Column::Amount)), "total")
            })
            .one_as::<SumRow>();
        let due = self
            .store
            .invoices()
            .refine(|q| {
                q.filter(invoices::Column::DueDate.gte(window.start))
                    .filter(invoices::Column::DueDate.lt(window.end_exclusive))
                    .select_only()
                    .column_as(total_of(invoices::Column::TotalAmount), "total")
            })
            .one_as::<SumRow>();

        let (actual, due) = tokio::try_join!(actual, due)?;
        Ok(TrendSeriesBuilder::cash_inflow_point(
            window,
            actual.unwrap_or_default().total,
            due.unwrap_or_default().total,
        ))
    }

    async fn query_reconciliation(&self) -> Result<Reconciliation, RepositoryError> {
        let invoice_paid = self
            .store
            .invoices()
            .refine(|q| {
                q.select_only()
                    .column_as(total_of(invoices::Column::PaidAmount), "total")
            })
            .one_as::<SumRow>();
        let ledger = self
            .store
            .payments()
            .refine(|q| {
                q.select_only()
                    .column_as(sum_or_zero(col(payments::Entity, payments::Column::Amount)), "total")
            })
            .one_as::<SumRow>();

        let (invoice_paid, ledger) = tokio::try_join!(invoice_paid, ledger)?;
        Ok(Reconciliation::from_totals(
            invoice_paid.unwrap_or_default().total,
            ledger.unwrap_or_default().total,
        ))
    }
}

#[async_trait]
impl MetricsSource for MetricsRepository {
    fn context(&self) -> &TenantContext {
        &self.ctx
    }

    async fn kpis(&self) -> Result<BaseKpis, MetricsError> {
        Ok(self.query_kpis().await?)
    }

    async fn recent_invoices(&self, limit: u64) -> Result<Vec<RecentInvoice>, MetricsError> {
        Ok(self.query_recent_invoices(limit).await?)
    }

    async fn top_customers_by_outstanding(
        &self,
        limit: u64,
    ) -> Result<Vec<CustomerOutstanding>, MetricsError> {
        Ok(self.query_top_customers(limit).await?)
    }

    async fn has_data(&self) -> Result<bool, MetricsError> {
        Ok(self.query_has_data().await?)
    }

    async fn aging_analysis(&self) -> Result<Vec<AgingBucket>, MetricsError> {
        let calculator = AgingBucketCalculator::new(self.ctx.now());
        let buckets = try_join_all(calculator.windows().map(|w| self.aging_bucket(w))).await?;
        Ok(buckets)
    }

    async fn regional_breakup(&self) -> Result<Vec<RegionalBreakup>, MetricsError> {
        Ok(self.query_regional().await?)
    }

    async fn monthly_trends(&self, windows: &[MonthWindow]) -> Result<Vec<TrendPoint>, MetricsError> {
        Ok(try_join_all(windows.iter().map(|w| self.trend_point(w))).await?)
    }

    async fn top_customers_by_overdue(
        &self,
        limit: u64,
    ) -> Result<Vec<OverdueCustomer>, MetricsError> {
        Ok(self.query_top_overdue(limit).await?)
    }

    async fn cash_inflow_comparison(
        &self,
        windows: &[MonthWindow],
    ) -> Result<Vec<CashInflowPoint>, MetricsError> {
        Ok(try_join_all(windows.iter().map(|w| self.cash_point(w))).await?)
    }

    async fn reconciliation(&self) -> Result<Reconciliation, MetricsError> {
        Ok(self.query_reconciliation().await?)
    }
}
