//! Storage seam for the dashboard assembler.

use async_trait::async_trait;
use thiserror::Error;

use super::aging::AgingBucket;
use super::trends::MonthWindow;
use super::types::{
    BaseKpis, CashInflowPoint, CustomerOutstanding, OverdueCustomer, Reconciliation,
    RecentInvoice, RegionalBreakup, TrendPoint,
};
use crate::tenant::TenantContext;

/// Errors raised while reading metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The backing store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored value could not be interpreted.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Tenant-scoped metric queries.
///
/// An implementation is bound to exactly one [`TenantContext`]; every method
/// reads only that tenant's rows.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Context the source is bound to.
    fn context(&self) -> &TenantContext;

    /// Raw KPI counters.
    async fn kpis(&self) -> Result<BaseKpis, MetricsError>;

    /// Most recently created invoices.
    async fn recent_invoices(&self, limit: u64) -> Result<Vec<RecentInvoice>, MetricsError>;

    /// Customers with the largest open balance.
    async fn top_customers_by_outstanding(
        &self,
        limit: u64,
    ) -> Result<Vec<CustomerOutstanding>, MetricsError>;

    /// True when the tenant owns any customer, invoice or payment.
    async fn has_data(&self) -> Result<bool, MetricsError>;

    /// Open balances per aging bucket, always four entries.
    async fn aging_analysis(&self) -> Result<Vec<AgingBucket>, MetricsError>;

    /// Invoice totals per customer region.
    async fn regional_breakup(&self) -> Result<Vec<RegionalBreakup>, MetricsError>;

    /// One trend point per window, same order.
    async fn monthly_trends(&self, windows: &[MonthWindow]) -> Result<Vec<TrendPoint>, MetricsError>;

    /// Customers with the largest overdue balance.
    async fn top_customers_by_overdue(&self, limit: u64)
    -> Result<Vec<OverdueCustomer>, MetricsError>;

    /// One cash point per window, same order.
    async fn cash_inflow_comparison(
        &self,
        windows: &[MonthWindow],
    ) -> Result<Vec<CashInflowPoint>, MetricsError>;

    /// Invoice-recorded payments versus the payments ledger.
    async fn reconciliation(&self) -> Result<Reconciliation, MetricsError>;
}
