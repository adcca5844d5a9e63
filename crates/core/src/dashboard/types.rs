//! Dashboard snapshot types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aging::{AgingBucket, AgingBucketCalculator};

/// KPI values read straight from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseKpis {
    /// Number of customers owned by the tenant.
    pub customer_count: i64,
    /// Number of invoices in range.
    pub invoice_count: i64,
    /// `max(Σ total - Σ paid, 0)` over invoices in range.
    pub outstanding_total: Decimal,
    /// Invoices with an open balance past their due date.
    pub overdue_count: i64,
    /// Payments received since the first day of the current month.
    pub collected_this_month: Decimal,
    /// Σ total over invoices in range.
    pub total_invoice_amount: Decimal,
}

/// Full KPI block: the base values plus derived ratios.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    /// Number of customers owned by the tenant.
    pub customer_count: i64,
    /// Number of invoices in range.
    pub invoice_count: i64,
    /// Open balance across invoices in range.
    pub outstanding_total: Decimal,
    /// Overdue invoice count.
    pub overdue_count: i64,
    /// Payments received this month.
    pub collected_this_month: Decimal,
    /// Σ total over invoices in range.
    pub total_invoice_amount: Decimal,
    /// Days sales outstanding.
    pub dso: i64,
    /// Collection effectiveness index, 0..=100.
    pub cei: i64,
    /// On-time collection rate, 0..=100.
    pub on_time_collection_rate: i64,
    /// Promise-to-pay score, 0..=100.
    pub promise_to_pay: i64,
    /// Share of invoices not overdue, 0..=100.
    pub sla_compliance: i64,
}

/// Row of the recent-invoices table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentInvoice {
    /// Invoice ID.
    pub id: Uuid,
    /// Human-readable number.
    pub invoice_number: String,
    /// Customer display name.
    pub customer_name: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date.
    pub due_date: NaiveDate,
    /// Invoice total.
    pub total_amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// Lifecycle status.
    pub status: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Customer ranked by open balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOutstanding {
    /// Customer ID.
    pub customer_id: Uuid,
    /// Customer display name.
    pub customer_name: String,
    /// Number of invoices with an open balance.
    pub invoice_count: i64,
    /// Open balance.
    pub outstanding: Decimal,
}

/// Customer ranked by overdue balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverdueCustomer {
    /// Customer ID.
    pub customer_id: Uuid,
    /// Customer display name.
    pub customer_name: String,
    /// Number of overdue invoices.
    pub overdue_count: i64,
    /// Overdue balance.
    pub overdue_amount: Decimal,
    /// Earliest due date among the overdue invoices.
    pub oldest_due_date: Option<NaiveDate>,
}

/// Invoice totals for one customer region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalBreakup {
    /// Region (state); `"Unassigned"` when the customer has none.
    pub region: String,
    /// Number of invoices.
    pub invoice_count: i64,
    /// Σ total.
    pub total_amount: Decimal,
    /// Open balance.
    pub outstanding: Decimal,
}

/// One month of the sales trend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// Month label, e.g. `"Oct 2026"`.
    pub month: String,
    /// Σ total of invoices issued in the month.
    pub sales: Decimal,
    /// Σ (total - paid) of invoices issued in the month.
    pub balance_due: Decimal,
}

/// Two-month rollup with its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterPoint {
    /// `Q1`, `Q2`, ...
    pub label: String,
    /// Σ sales of the months in the bucket.
    pub actual: Decimal,
    /// `round(actual × 1.1)`.
    pub target: Decimal,
}

/// Actual versus estimated cash for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashInflowPoint {
    /// Month label.
    pub month: String,
    /// Payments received in the month.
    pub actual: Decimal,
    /// 80% of the invoice totals falling due in the month.
    pub estimated: Decimal,
}

/// Invoice-recorded payments versus the payments ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Σ `paid_amount` recorded on invoices.
    pub invoice_paid_total: Decimal,
    /// Σ payment amounts.
    pub payments_total: Decimal,
    /// `invoice_paid_total - payments_total`.
    pub difference: Decimal,
    /// True when the difference is zero.
    pub is_balanced: bool,
}

impl Reconciliation {
    /// Builds the section from both totals.
    #[must_use]
    pub fn from_totals(invoice_paid_total: Decimal, payments_total: Decimal) -> Self {
        let difference = invoice_paid_total - payments_total;
        Self {
            invoice_paid_total,
            payments_total,
            difference,
            is_balanced: difference.is_zero(),
        }
    }
}

/// Complete dashboard payload for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Range label the snapshot was computed for.
    pub range: String,
    /// Evaluation instant.
    pub generated_at: DateTime<Utc>,
    /// KPI block.
    pub kpis: KpiSummary,
    /// Most recently created invoices.
    pub recent_invoices: Vec<RecentInvoice>,
    /// Customers with the largest open balance.
    pub top_customers: Vec<CustomerOutstanding>,
    /// Always exactly four buckets.
    pub aging: Vec<AgingBucket>,
    /// Per-region totals.
    pub regional: Vec<RegionalBreakup>,
    /// Monthly sales, oldest first.
    pub monthly_trends: Vec<TrendPoint>,
    /// Two-month rollups of `monthly_trends`.
    pub quarterly: Vec<QuarterPoint>,
    /// Customers with the largest overdue balance.
    pub top_overdue_customers: Vec<OverdueCustomer>,
    /// Monthly cash actual vs estimate.
    pub cash_inflow: Vec<CashInflowPoint>,
    /// Ledger cross-check.
    pub reconciliation: Reconciliation,
}

impl DashboardSnapshot {
    /// The canonical all-zero snapshot, served when assembly fails outright.
    ///
    /// Every KPI is zero here, including `sla_compliance`. A tenant that
    /// simply has no invoices reports 100 instead (see
    /// [`DerivedMetricsCalculator::sla_compliance`]), so a failed assembly
    /// stays distinguishable from an empty one.
    ///
    /// [`DerivedMetricsCalculator::sla_compliance`]: super::kpi::DerivedMetricsCalculator::sla_compliance
    #[must_use]
    pub fn zeroed(range: impl Into<String>, generated_at: DateTime<Utc>) -> Self {
        Self {
            range: range.into(),
            generated_at,
            kpis: KpiSummary::default(),
            recent_invoices: Vec::new(),
            top_customers: Vec::new(),
            aging: AgingBucketCalculator::zeroed(),
            regional: Vec::new(),
            monthly_trends: Vec::new(),
            quarterly: Vec::new(),
            top_overdue_customers: Vec::new(),
            cash_inflow: Vec::new(),
            reconciliation: Reconciliation::default(),
        }
    }
}
