//! In-memory multi-tenant ledger backing the assembler tests.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::aging::{AgingBucket, AgingBucketCalculator};
use super::source::{MetricsError, MetricsSource};
use super::trends::{MonthWindow, TrendSeriesBuilder};
use super::types::{
    BaseKpis, CashInflowPoint, CustomerOutstanding, OverdueCustomer, Reconciliation,
    RecentInvoice, RegionalBreakup, TrendPoint,
};
use crate::tenant::{OwnerId, TenantContext};

#[derive(Debug, Clone)]
pub struct MemCustomer {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub name: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MemInvoice {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub customer_id: Uuid,
    pub number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total: Decimal,
    pub paid: Decimal,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
}

impl MemInvoice {
    fn outstanding(&self) -> Decimal {
        (self.total - self.paid).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone)]
pub struct MemPayment {
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Default)]
pub struct MemLedger {
    pub customers: Vec<MemCustomer>,
    pub invoices: Vec<MemInvoice>,
    pub payments: Vec<MemPayment>,
}

impl MemLedger {
    pub fn add_customer(&mut self, owner_id: OwnerId, name: &str, region: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.customers.push(MemCustomer {
            id,
            owner_id,
            name: name.to_string(),
            region: region.map(ToString::to_string),
        });
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_invoice(
        &mut self,
        owner_id: OwnerId,
        customer_id: Uuid,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        total: Decimal,
        paid: Decimal,
        status: &'static str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.invoices.push(MemInvoice {
            id,
            owner_id,
            customer_id,
            number: format!("INV-{}", self.invoices.len() + 1),
            issue_date,
            due_date,
            total,
            paid,
            status,
            created_at: issue_date.and_time(chrono::NaiveTime::MIN).and_utc(),
        });
        id
    }

    pub fn add_payment(&mut self, invoice_id: Uuid, amount: Decimal, date: NaiveDate) {
        self.payments.push(MemPayment {
            invoice_id,
            amount,
            date,
        });
    }
}

/// Source over a [`MemLedger`] that can be told to fail named calls.
pub struct MemSource<'a> {
    ledger: &'a MemLedger,
    ctx: TenantContext,
    failing: HashSet<&'static str>,
}

impl<'a> MemSource<'a> {
    pub fn new(ledger: &'a MemLedger, ctx: TenantContext) -> Self {
        Self {
            ledger,
            ctx,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    fn check(&self, call: &'static str) -> Result<(), MetricsError> {
        if self.failing.contains(call) {
            Err(MetricsError::Storage(format!("{call} unavailable")))
        } else {
            Ok(())
        }
    }

    fn invoices(&self) -> impl Iterator<Item = &MemInvoice> {
        let owner = self.ctx.owner_id();
        self.ledger.invoices.iter().filter(move |i| i.owner_id == owner)
    }

    fn invoices_in_range(&self) -> impl Iterator<Item = &MemInvoice> {
        let range = self.ctx.filter().range;
        self.invoices().filter(move |i| {
            range.is_none_or(|r| i.issue_date >= r.start_date() && i.issue_date <= r.end_date())
        })
    }

    fn customers(&self) -> impl Iterator<Item = &MemCustomer> {
        let owner = self.ctx.owner_id();
        self.ledger.customers.iter().filter(move |c| c.owner_id == owner)
    }

    fn payments(&self) -> impl Iterator<Item = &MemPayment> {
        let ids: HashSet<Uuid> = self.invoices().map(|i| i.id).collect();
        self.ledger
            .payments
            .iter()
            .filter(move |p| ids.contains(&p.invoice_id))
    }

    fn customer_name(&self, id: Uuid) -> String {
        self.customers()
            .find(|c| c.id == id)
            .map_or_else(|| "Unknown".to_string(), |c| c.name.clone())
    }

    fn is_overdue(&self, invoice: &MemInvoice) -> bool {
        invoice.outstanding() > Decimal::ZERO
            && (invoice.status == "overdue"
                || (invoice.due_date < self.ctx.today()
                    && !matches!(invoice.status, "paid" | "cancelled")))
    }
}

fn count(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl MetricsSource for MemSource<'_> {
    fn context(&self) -> &TenantContext {
        &self.ctx
    }

    async fn kpis(&self) -> Result<BaseKpis, MetricsError> {
        self.check("kpis")?;
        let total: Decimal = self.invoices_in_range().map(|i| i.total).sum();
        let paid: Decimal = self.invoices_in_range().map(|i| i.paid).sum();
        let today = self.ctx.today();
        let month_start = NaiveDate::from_ymd_opt(
            chrono::Datelike::year(&today),
            chrono::Datelike::month(&today),
            1,
        )
        .ok_or_else(|| MetricsError::InvalidData("month start".into()))?;

        Ok(BaseKpis {
            customer_count: count(self.customers().count()),
            invoice_count: count(self.invoices_in_range().count()),
            outstanding_total: (total - paid).max(Decimal::ZERO),
            overdue_count: count(self.invoices_in_range().filter(|i| self.is_overdue(i)).count()),
            collected_this_month: self
                .payments()
                .filter(|p| p.date >= month_start)
                .map(|p| p.amount)
                .sum(),
            total_invoice_amount: total,
        })
    }

    async fn recent_invoices(&self, limit: u64) -> Result<Vec<RecentInvoice>, MetricsError> {
        self.check("recent_invoices")?;
        let mut rows: Vec<_> = self.invoices().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|i| RecentInvoice {
                id: i.id,
                invoice_number: i.number.clone(),
                customer_name: Some(self.customer_name(i.customer_id)),
                issue_date: i.issue_date,
                due_date: i.due_date,
                total_amount: i.total,
                paid_amount: i.paid,
                status: i.status.to_string(),
                created_at: i.created_at,
            })
            .collect())
    }

    async fn top_customers_by_outstanding(
        &self,
        limit: u64,
    ) -> Result<Vec<CustomerOutstanding>, MetricsError> {
        self.check("top_customers")?;
        let mut by_customer: BTreeMap<Uuid, (i64, Decimal)> = BTreeMap::new();
        for invoice in self.invoices().filter(|i| i.outstanding() > Decimal::ZERO) {
            let entry = by_customer.entry(invoice.customer_id).or_default();
            entry.0 += 1;
            entry.1 += invoice.outstanding();
        }
        let mut rows: Vec<_> = by_customer
            .into_iter()
            .map(|(id, (invoice_count, outstanding))| CustomerOutstanding {
                customer_id: id,
                customer_name: self.customer_name(id),
                invoice_count,
                outstanding,
            })
            .collect();
        rows.sort_by(|a, b| b.outstanding.cmp(&a.outstanding));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn has_data(&self) -> Result<bool, MetricsError> {
        self.check("has_data")?;
        Ok(self.customers().count() + self.invoices().count() + self.payments().count() > 0)
    }

    async fn aging_analysis(&self) -> Result<Vec<AgingBucket>, MetricsError> {
        self.check("aging")?;
        let calc = AgingBucketCalculator::new(self.ctx.now());
        Ok(calc.partition(self.invoices().map(|i| (i.due_date, i.outstanding()))))
    }

    async fn regional_breakup(&self) -> Result<Vec<RegionalBreakup>, MetricsError> {
        self.check("regional")?;
        let mut by_region: BTreeMap<String, RegionalBreakup> = BTreeMap::new();
        for invoice in self.invoices_in_range() {
            let region = self
                .customers()
                .find(|c| c.id == invoice.customer_id)
                .and_then(|c| c.region.clone())
                .unwrap_or_else(|| "Unassigned".to_string());
            let row = by_region.entry(region.clone()).or_insert(RegionalBreakup {
                region,
                invoice_count: 0,
                total_amount: Decimal::ZERO,
                outstanding: Decimal::ZERO,
            });
            row.invoice_count += 1;
            row.total_amount += invoice.total;
            row.outstanding += invoice.outstanding();
        }
        Ok(by_region.into_values().collect())
    }

    async fn monthly_trends(&self, windows: &[MonthWindow]) -> Result<Vec<TrendPoint>, MetricsError> {
        self.check("monthly_trends")?;
        Ok(TrendSeriesBuilder::monthly_series(
            windows,
            self.invoices().map(|i| (i.issue_date, i.total, i.paid)),
        ))
    }

    async fn top_customers_by_overdue(
        &self,
        limit: u64,
    ) -> Result<Vec<OverdueCustomer>, MetricsError> {
        self.check("top_overdue")?;
        let mut by_customer: BTreeMap<Uuid, OverdueCustomer> = BTreeMap::new();
        for invoice in self.invoices().filter(|i| self.is_overdue(i)) {
            let row = by_customer
                .entry(invoice.customer_id)
                .or_insert_with(|| OverdueCustomer {
                    customer_id: invoice.customer_id,
                    customer_name: self.customer_name(invoice.customer_id),
                    overdue_count: 0,
                    overdue_amount: Decimal::ZERO,
                    oldest_due_date: None,
                });
            row.overdue_count += 1;
            row.overdue_amount += invoice.outstanding();
            row.oldest_due_date = Some(
                row.oldest_due_date
                    .map_or(invoice.due_date, |d| d.min(invoice.due_date)),
            );
        }
        let mut rows: Vec<_> = by_customer.into_values().collect();
        rows.sort_by(|a, b| b.overdue_amount.cmp(&a.overdue_amount));
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn cash_inflow_comparison(
        &self,
        windows: &[MonthWindow],
    ) -> Result<Vec<CashInflowPoint>, MetricsError> {
        self.check("cash_inflow")?;
        Ok(windows
            .iter()
            .map(|w| {
                let actual = self.payments().filter(|p| w.contains(p.date)).map(|p| p.amount).sum();
                let due = self.invoices().filter(|i| w.contains(i.due_date)).map(|i| i.total).sum();
                TrendSeriesBuilder::cash_inflow_point(w, actual, due)
            })
            .collect())
    }

    async fn reconciliation(&self) -> Result<Reconciliation, MetricsError> {
        self.check("reconciliation")?;
        Ok(Reconciliation::from_totals(
            self.invoices().map(|i| i.paid).sum(),
            self.payments().map(|p| p.amount).sum(),
        ))
    }
}
