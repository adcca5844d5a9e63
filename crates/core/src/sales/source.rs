//! Storage seam for the sales-invoice dashboard.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::filter::SalesInvoiceFilter;
use super::types::{
    SalesMonthPoint, SalesReconciliation, SalesRegionBreakup, SalesSummary, SalesTopCustomer,
    TaxBreakup,
};
use crate::dashboard::{MetricsError, MonthWindow, TrendSeriesBuilder};
use crate::tenant::OwnerId;

/// Tenant plus filter for one sales-invoice request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesContext {
    owner_id: OwnerId,
    filter: SalesInvoiceFilter,
    now: DateTime<Utc>,
}

impl SalesContext {
    /// Context for a known tenant.
    #[must_use]
    pub const fn new(owner_id: OwnerId, filter: SalesInvoiceFilter, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            filter,
            now,
        }
    }

    /// The tenant.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// The filter.
    #[must_use]
    pub const fn filter(&self) -> &SalesInvoiceFilter {
        &self.filter
    }

    /// Evaluation instant.
    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Evaluation date.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    /// Months for the trend, restricted to the filter's dates.
    #[must_use]
    pub fn month_windows(&self) -> Vec<MonthWindow> {
        TrendSeriesBuilder::new(self.now, self.filter.date_range(self.today())).month_windows()
    }
}

/// Tenant-scoped, filtered sales-invoice queries.
#[async_trait]
pub trait SalesInvoiceSource: Send + Sync {
    /// Context the source is bound to.
    fn context(&self) -> &SalesContext;

    /// Headline totals.
    async fn summary(&self) -> Result<SalesSummary, MetricsError>;

    /// Per region/zone totals.
    async fn region_breakup(&self) -> Result<Vec<SalesRegionBreakup>, MetricsError>;

    /// Per GST component totals for the selected components.
    async fn tax_breakup(&self) -> Result<Vec<TaxBreakup>, MetricsError>;

    /// One point per window, same order.
    async fn monthly_trend(&self, windows: &[MonthWindow]) -> Result<Vec<SalesMonthPoint>, MetricsError>;

    /// Customers with the largest invoiced amount.
    async fn top_customers(&self, limit: u64) -> Result<Vec<SalesTopCustomer>, MetricsError>;

    /// Invoiced versus received.
    async fn reconciliation(&self) -> Result<SalesReconciliation, MetricsError>;
}
