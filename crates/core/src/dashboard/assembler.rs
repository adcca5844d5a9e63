//! Dashboard snapshot assembly.
//!
//! Assembly runs in two concurrent batches. The base batch (KPIs, recent
//! invoices, top customers, data presence) must succeed as a whole; if any
//! part fails the caller gets the canonical zeroed snapshot. Each analytics
//! section in the second batch fails independently and is replaced by its
//! empty value.

use serde::Serialize;
use tracing::{debug, error, warn};

use super::aging::AgingBucketCalculator;
use super::kpi::DerivedMetricsCalculator;
use super::source::{MetricsError, MetricsSource};
use super::trends::TrendSeriesBuilder;
use super::types::DashboardSnapshot;
use crate::tenant::OwnerId;

/// Row limits for the ranked lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    /// Rows in the recent-invoices table.
    pub recent_invoices: u64,
    /// Rows in the top-customer tables.
    pub top_customers: u64,
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self {
            recent_invoices: 5,
            top_customers: 5,
        }
    }
}

/// Analytics sections that may be defaulted independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    /// Aging buckets.
    Aging,
    /// Regional breakup.
    Regional,
    /// Monthly trend and its rollup.
    MonthlyTrends,
    /// Top overdue customers.
    TopOverdueCustomers,
    /// Cash inflow comparison.
    CashInflow,
    /// Ledger reconciliation.
    Reconciliation,
}

impl Section {
    /// Log / wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aging => "aging",
            Self::Regional => "regional",
            Self::MonthlyTrends => "monthlyTrends",
            Self::TopOverdueCustomers => "topOverdueCustomers",
            Self::CashInflow => "cashInflow",
            Self::Reconciliation => "reconciliation",
        }
    }
}

/// How one section was produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SectionStatus {
    /// Computed from storage.
    #[default]
    Loaded,
    /// Replaced by its empty value after a failure.
    Defaulted {
        /// Failure message.
        reason: String,
    },
}

impl SectionStatus {
    /// True when the section was replaced.
    #[must_use]
    pub const fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }
}

/// Per-section status of one assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    /// Aging buckets.
    pub aging: SectionStatus,
    /// Regional breakup.
    pub regional: SectionStatus,
    /// Monthly trend and rollup.
    pub monthly_trends: SectionStatus,
    /// Top overdue customers.
    pub top_overdue_customers: SectionStatus,
    /// Cash inflow.
    pub cash_inflow: SectionStatus,
    /// Reconciliation.
    pub reconciliation: SectionStatus,
}

impl SectionReport {
    fn all_defaulted(reason: &str) -> Self {
        let status = || SectionStatus::Defaulted {
            reason: reason.to_string(),
        };
        Self {
            aging: status(),
            regional: status(),
            monthly_trends: status(),
            top_overdue_customers: status(),
            cash_inflow: status(),
            reconciliation: status(),
        }
    }

    fn status_mut(&mut self, section: Section) -> &mut SectionStatus {
        match section {
            Section::Aging => &mut self.aging,
            Section::Regional => &mut self.regional,
            Section::MonthlyTrends => &mut self.monthly_trends,
            Section::TopOverdueCustomers => &mut self.top_overdue_customers,
            Section::CashInflow => &mut self.cash_inflow,
            Section::Reconciliation => &mut self.reconciliation,
        }
    }

    /// Sections that were replaced, in display order.
    #[must_use]
    pub fn defaulted(&self) -> Vec<Section> {
        [
            (Section::Aging, &self.aging),
            (Section::Regional, &self.regional),
            (Section::MonthlyTrends, &self.monthly_trends),
            (Section::TopOverdueCustomers, &self.top_overdue_customers),
            (Section::CashInflow, &self.cash_inflow),
            (Section::Reconciliation, &self.reconciliation),
        ]
        .into_iter()
        .filter(|(_, status)| status.is_defaulted())
        .map(|(section, _)| section)
        .collect()
    }
}

/// Overall result of one assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum AssemblyOutcome<S = Section> {
    /// Every section loaded.
    Complete,
    /// Some analytics sections were defaulted.
    Partial {
        /// The defaulted sections.
        defaulted: Vec<S>,
    },
    /// The base batch failed; the snapshot is the zeroed one.
    Fallback {
        /// Failure message.
        reason: String,
    },
}

impl<S> AssemblyOutcome<S> {
    /// `Complete` when nothing was defaulted, `Partial` otherwise.
    #[must_use]
    pub fn from_defaulted(defaulted: Vec<S>) -> Self {
        if defaulted.is_empty() {
            Self::Complete
        } else {
            Self::Partial { defaulted }
        }
    }

    /// True for the zeroed fallback.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Snapshot plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDashboard {
    /// Payload for the client.
    pub snapshot: DashboardSnapshot,
    /// True when the tenant owns any data.
    pub has_data: bool,
    /// Per-section status.
    pub sections: SectionReport,
    /// Overall outcome.
    pub outcome: AssemblyOutcome,
}

/// Builds dashboard snapshots from a [`MetricsSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardAssembler {
    limits: DashboardLimits,
}

impl DashboardAssembler {
    /// Assembler with the given row limits.
    #[must_use]
    pub const fn new(limits: DashboardLimits) -> Self {
        Self { limits }
    }

    /// Assembles the snapshot for the source's tenant. Never fails.
    pub async fn assemble<S>(&self, source: &S) -> AssembledDashboard
    where
        S: MetricsSource + ?Sized,
    {
        let ctx = source.context();
        let owner_id = ctx.owner_id();
        let range_label = ctx.filter().range_label.clone();

        let (kpis, recent, top, has_data) = tokio::join!(
            source.kpis(),
            source.recent_invoices(self.limits.recent_invoices),
            source.top_customers_by_outstanding(self.limits.top_customers),
            source.has_data(),
        );

        let base_batch = kpis.and_then(|kpis| Ok((kpis, recent?, top?, has_data?)));
        let (base, recent_invoices, top_customers, has_data) = match base_batch {
            Ok(batch) => batch,
            Err(e) => {
                error!(
                    owner_id = %owner_id,
                    error = %e,
                    "Dashboard assembly failed, serving zeroed snapshot"
                );
                let reason = e.to_string();
                return AssembledDashboard {
                    snapshot: DashboardSnapshot::zeroed(range_label, ctx.now()),
                    has_data: false,
                    sections: SectionReport::all_defaulted(&reason),
                    outcome: AssemblyOutcome::Fallback { reason },
                };
            }
        };

        let kpis = DerivedMetricsCalculator::derive(&base, ctx.filter().days_in_range());
        let windows = TrendSeriesBuilder::new(ctx.now(), ctx.filter().range).month_windows();

        let (aging, regional, monthly, overdue, cash, reconciliation) = tokio::join!(
            source.aging_analysis(),
            source.regional_breakup(),
            source.monthly_trends(&windows),
            source.top_customers_by_overdue(self.limits.top_customers),
            source.cash_inflow_comparison(&windows),
            source.reconciliation(),
        );

        let mut sections = SectionReport::default();
        let aging = settle(&mut sections, owner_id, Section::Aging, aging)
            .unwrap_or_else(AgingBucketCalculator::zeroed);
        let regional = settle(&mut sections, owner_id, Section::Regional, regional).unwrap_or_default();
        let monthly_trends =
            settle(&mut sections, owner_id, Section::MonthlyTrends, monthly).unwrap_or_default();
        let top_overdue_customers =
            settle(&mut sections, owner_id, Section::TopOverdueCustomers, overdue).unwrap_or_default();
        let cash_inflow = settle(&mut sections, owner_id, Section::CashInflow, cash).unwrap_or_default();
        let reconciliation =
            settle(&mut sections, owner_id, Section::Reconciliation, reconciliation).unwrap_or_default();

        let outcome = AssemblyOutcome::from_defaulted(sections.defaulted());

        debug!(owner_id = %owner_id, range = %range_label, ?outcome, "Dashboard assembled");

        AssembledDashboard {
            snapshot: DashboardSnapshot {
                range: range_label,
                generated_at: ctx.now(),
                kpis,
                recent_invoices,
                top_customers,
                aging,
                regional,
                quarterly: TrendSeriesBuilder::quarterly(&monthly_trends),
                monthly_trends,
                top_overdue_customers,
                cash_inflow,
                reconciliation,
            },
            has_data,
            sections,
            outcome,
        }
    }
}

/// Records the section status and logs a failure.
fn settle<T>(
    sections: &mut SectionReport,
    owner_id: OwnerId,
    section: Section,
    result: Result<T, MetricsError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(
                owner_id = %owner_id,
                section = section.as_str(),
                error = %e,
                "Dashboard section failed, using empty value"
            );
            *sections.status_mut(section) = SectionStatus::Defaulted {
                reason: e.to_string(),
            };
            None
        }
    }
}
