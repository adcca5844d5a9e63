//! Sales-invoice dashboard assembly.
//!
//! Same degradation rules as the main dashboard: the summary must load or the
//! zeroed snapshot is served; every other section fails on its own.

use serde::Serialize;
use tracing::{error, warn};

use super::source::SalesInvoiceSource;
use super::types::SalesInvoiceSnapshot;
use crate::dashboard::{AssemblyOutcome, MetricsError, SectionStatus};
use crate::tenant::OwnerId;

/// Sections of the sales-invoice dashboard that may be defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SalesSection {
    /// Region/zone breakup.
    RegionBreakup,
    /// GST component breakup.
    TaxBreakup,
    /// Monthly trend.
    MonthlyTrend,
    /// Top customers.
    TopCustomers,
    /// Reconciliation.
    Reconciliation,
}

impl SalesSection {
    /// Log / wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RegionBreakup => "regionBreakup",
            Self::TaxBreakup => "taxBreakup",
            Self::MonthlyTrend => "monthlyTrend",
            Self::TopCustomers => "topCustomers",
            Self::Reconciliation => "reconciliation",
        }
    }
}

/// Snapshot plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSalesDashboard {
    /// Payload for the client.
    pub snapshot: SalesInvoiceSnapshot,
    /// True when any invoice matched.
    pub has_data: bool,
    /// Status of each defaultable section, in display order.
    pub sections: Vec<(SalesSection, SectionStatus)>,
    /// Overall outcome.
    pub outcome: AssemblyOutcome<SalesSection>,
}

/// Builds sales-invoice snapshots.
#[derive(Debug, Clone, Copy)]
pub struct SalesDashboardAssembler {
    top_customers: u64,
}

impl Default for SalesDashboardAssembler {
    fn default() -> Self {
        Self { top_customers: 10 }
    }
}

impl SalesDashboardAssembler {
    /// Assembler listing `top_customers` customers.
    #[must_use]
    pub const fn new(top_customers: u64) -> Self {
        Self { top_customers }
    }

    /// Assembles the snapshot. Never fails.
    pub async fn assemble<S>(&self, source: &S) -> AssembledSalesDashboard
    where
        S: SalesInvoiceSource + ?Sized,
    {
        let ctx = source.context();
        let owner_id = ctx.owner_id();

        let summary = match source.summary().await {
            Ok(summary) => summary.with_average(),
            Err(e) => {
                error!(
                    owner_id = %owner_id,
                    error = %e,
                    "Sales dashboard assembly failed, serving zeroed snapshot"
                );
                let reason = e.to_string();
                return AssembledSalesDashboard {
                    snapshot: SalesInvoiceSnapshot::zeroed(ctx.now()),
                    has_data: false,
                    sections: Vec::new(),
                    outcome: AssemblyOutcome::Fallback { reason },
                };
            }
        };

        let windows = ctx.month_windows();
        let (regions, taxes, monthly, top, reconciliation) = tokio::join!(
            source.region_breakup(),
            source.tax_breakup(),
            source.monthly_trend(&windows),
            source.top_customers(self.top_customers),
            source.reconciliation(),
        );

        let mut sections = Vec::with_capacity(5);
        let region_breakup = settle(&mut sections, owner_id, SalesSection::RegionBreakup, regions);
        let tax_breakup = settle(&mut sections, owner_id, SalesSection::TaxBreakup, taxes);
        let monthly_trend = settle(&mut sections, owner_id, SalesSection::MonthlyTrend, monthly);
        let top_customers = settle(&mut sections, owner_id, SalesSection::TopCustomers, top);
        let reconciliation =
            settle(&mut sections, owner_id, SalesSection::Reconciliation, reconciliation);

        let defaulted = sections
            .iter()
            .filter(|(_, status)| status.is_defaulted())
            .map(|(section, _)| *section)
            .collect();

        AssembledSalesDashboard {
            has_data: summary.invoice_count > 0,
            snapshot: SalesInvoiceSnapshot {
                generated_at: ctx.now(),
                summary,
                region_breakup,
                tax_breakup,
                monthly_trend,
                top_customers,
                reconciliation,
            },
            sections,
            outcome: AssemblyOutcome::from_defaulted(defaulted),
        }
    }
}

fn settle<T: Default>(
    sections: &mut Vec<(SalesSection, SectionStatus)>,
    owner_id: OwnerId,
    section: SalesSection,
    result: Result<T, MetricsError>,
) -> T {
    match result {
        Ok(value) => {
            sections.push((section, SectionStatus::Loaded));
            value
        }
        Err(e) => {
            warn!(
                owner_id = %owner_id,
                section = section.as_str(),
                error = %e,
                "Sales dashboard section failed, using empty value"
            );
            sections.push((
                section,
                SectionStatus::Defaulted {
                    reason: e.to_string(),
                },
            ));
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::MonthWindow;
    use crate::sales::filter::{SalesInvoiceFilter, TaxType};
    use crate::sales::source::SalesContext;
    use crate::sales::types::{
        SalesMonthPoint, SalesReconciliation, SalesRegionBreakup, SalesSummary, SalesTopCustomer,
        TaxBreakup,
    };
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct CannedSource {
        ctx: SalesContext,
        fail: &'static [&'static str],
    }

    impl CannedSource {
        fn new(fail: &'static [&'static str]) -> Self {
            let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
            Self {
                ctx: SalesContext::new(OwnerId::new(), SalesInvoiceFilter::default(), now),
                fail,
            }
        }

        fn check(&self, call: &'static str) -> Result<(), MetricsError> {
            if self.fail.contains(&call) {
                Err(MetricsError::Storage(format!("{call} failed")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SalesInvoiceSource for CannedSource {
        fn context(&self) -> &SalesContext {
            &self.ctx
        }

        async fn summary(&self) -> Result<SalesSummary, MetricsError> {
            self.check("summary")?;
            Ok(SalesSummary {
                invoice_count: 4,
                customer_count: 2,
                taxable_total: dec!(1000),
                tax_total: dec!(180),
                grand_total: dec!(1180),
                received_total: dec!(590),
                average_invoice_value: Decimal::ZERO,
            })
        }

        async fn region_breakup(&self) -> Result<Vec<SalesRegionBreakup>, MetricsError> {
            self.check("regions")?;
            Ok(vec![SalesRegionBreakup {
                region: "South".into(),
                zone: Some("Z1".into()),
                invoice_count: 4,
                total_amount: dec!(1180),
            }])
        }

        async fn tax_breakup(&self) -> Result<Vec<TaxBreakup>, MetricsError> {
            self.check("taxes")?;
            Ok(vec![TaxBreakup {
                tax_type: TaxType::Igst,
                amount: dec!(180),
            }])
        }

        async fn monthly_trend(
            &self,
            windows: &[MonthWindow],
        ) -> Result<Vec<SalesMonthPoint>, MetricsError> {
            self.check("monthly")?;
            Ok(windows
                .iter()
                .map(|w| SalesMonthPoint {
                    month: w.label.clone(),
                    taxable: Decimal::ZERO,
                    tax: Decimal::ZERO,
                    total: Decimal::ZERO,
                })
                .collect())
        }

        async fn top_customers(&self, _limit: u64) -> Result<Vec<SalesTopCustomer>, MetricsError> {
            self.check("top")?;
            Ok(Vec::new())
        }

        async fn reconciliation(&self) -> Result<SalesReconciliation, MetricsError> {
            self.check("reconciliation")?;
            Ok(SalesReconciliation::new(dec!(1180), dec!(590), 2, 2))
        }
    }

    #[tokio::test]
    async fn test_complete_assembly() {
        let result = SalesDashboardAssembler::default()
            .assemble(&CannedSource::new(&[]))
            .await;

        assert!(result.has_data);
        assert_eq!(result.outcome, AssemblyOutcome::Complete);
        assert_eq!(result.snapshot.summary.average_invoice_value, dec!(295));
        assert_eq!(result.snapshot.monthly_trend.len(), 12);
        assert_eq!(result.snapshot.reconciliation.pending_total, dec!(590));
    }

    #[tokio::test]
    async fn test_summary_failure_serves_zeroed_snapshot() {
        let result = SalesDashboardAssembler::default()
            .assemble(&CannedSource::new(&["summary"]))
            .await;

        assert!(!result.has_data);
        assert!(result.outcome.is_fallback());
        assert_eq!(result.snapshot.summary, SalesSummary::default());
        assert!(result.snapshot.tax_breakup.is_empty());
    }

    #[tokio::test]
    async fn test_section_failure_is_isolated() {
        let result = SalesDashboardAssembler::default()
            .assemble(&CannedSource::new(&["taxes", "reconciliation"]))
            .await;

        assert_eq!(
            result.outcome,
            AssemblyOutcome::Partial {
                defaulted: vec![SalesSection::TaxBreakup, SalesSection::Reconciliation]
            }
        );
        assert!(result.snapshot.tax_breakup.is_empty());
        assert_eq!(result.snapshot.reconciliation, SalesReconciliation::default());
        assert_eq!(result.snapshot.region_breakup.len(), 1);
        assert_eq!(result.sections.len(), 5);
    }
}
