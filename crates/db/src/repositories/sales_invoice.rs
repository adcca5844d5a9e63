//! Sales invoice master repository.

use async_trait::async_trait;
use futures::future::try_join_all;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, FromQueryResult, Order, QueryFilter, QueryOrder,
    QuerySelect, Select,
};

use finboard_core::dashboard::{MetricsError, MonthWindow};
use finboard_core::sales::{
    SalesContext, SalesInvoiceFilter, SalesInvoiceSource, SalesMonthPoint, SalesReconciliation,
    SalesRegionBreakup, SalesSummary, SalesTopCustomer, TaxBreakup, TaxType,
};

use super::RepositoryError;
use crate::entities::sales_invoice_master::{Column, Entity};
use crate::scoped::{Scoped, ScopedStore, col, count_all, sum_or_zero};

const UNASSIGNED_REGION: &str = "Unassigned";

#[derive(Debug, Default, FromQueryResult)]
struct SummaryRow {
    invoice_count: i64,
    customer_count: i64,
    taxable_total: Decimal,
    tax_total: Decimal,
    grand_total: Decimal,
    received_total: Decimal,
}

#[derive(Debug, Default, FromQueryResult)]
struct TaxRow {
    cgst: Decimal,
    sgst: Decimal,
    igst: Decimal,
}

impl TaxRow {
    const fn amount(&self, tax_type: TaxType) -> Decimal {
        match tax_type {
            TaxType::Cgst => self.cgst,
            TaxType::Sgst => self.sgst,
            TaxType::Igst => self.igst,
        }
    }
}

#[derive(Debug, Default, FromQueryResult)]
struct MonthRow {
    taxable: Decimal,
    tax: Decimal,
    total: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct RegionRow {
    region: Option<String>,
    zone: Option<String>,
    invoice_count: i64,
    total_amount: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct TopCustomerRow {
    customer_name: String,
    invoice_count: i64,
    total_amount: Decimal,
    received_amount: Decimal,
}

#[derive(Debug, Default, FromQueryResult)]
struct ReconciliationRow {
    invoiced_total: Decimal,
    received_total: Decimal,
    invoice_count: i64,
    reconciled_count: i64,
}

const fn tax_column(tax_type: TaxType) -> Column {
    match tax_type {
        TaxType::Cgst => Column::CgstAmount,
        TaxType::Sgst => Column::SgstAmount,
        TaxType::Igst => Column::IgstAmount,
    }
}

fn total_of(column: Column) -> SimpleExpr {
    sum_or_zero(col(Entity, column))
}

fn tax_sum() -> SimpleExpr {
    sum_or_zero(
        col(Entity, Column::CgstAmount)
            .add(col(Entity, Column::SgstAmount))
            .add(col(Entity, Column::IgstAmount)),
    )
}

/// `%needle%` with LIKE metacharacters escaped.
fn contains_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Applies every populated filter field.
fn apply_filter(select: Select<Entity>, filter: &SalesInvoiceFilter) -> Select<Entity> {
    let mut cond = Condition::all();

    if let Some(from) = filter.date_from {
        cond = cond.add(Column::InvoiceDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        cond = cond.add(Column::InvoiceDate.lte(to));
    }
    if let Some(customer) = &filter.customer {
        cond = cond.add(
            Expr::expr(Func::lower(Expr::col((Entity, Column::CustomerName))))
                .like(contains_pattern(customer)),
        );
    }
    if let Some(unit) = &filter.business_unit {
        cond = cond.add(Column::BusinessUnit.eq(unit.as_str()));
    }
    if let Some(region) = &filter.region {
        cond = cond.add(Column::Region.eq(region.as_str()));
    }
    if let Some(zone) = &filter.zone {
        cond = cond.add(Column::Zone.eq(zone.as_str()));
    }
    if let Some(kind) = &filter.invoice_type {
        cond = cond.add(Column::InvoiceType.eq(kind.as_str()));
    }
    if let Some(min) = filter.amount_min {
        cond = cond.add(Column::TotalAmount.gte(min));
    }
    if let Some(max) = filter.amount_max {
        cond = cond.add(Column::TotalAmount.lte(max));
    }
    if !filter.tax_types.is_empty() {
        let any_tax = filter
            .tax_types
            .iter()
            .fold(Condition::any(), |any, t| any.add(tax_column(*t).gt(Decimal::ZERO)));
        cond = cond.add(any_tax);
    }

    select.filter(cond)
}

/// Filtered sales invoices for one tenant.
#[derive(Debug, Clone)]
pub struct SalesInvoiceRepository {
    store: ScopedStore,
    ctx: SalesContext,
}

impl SalesInvoiceRepository {
    /// Creates a repository bound to the tenant and filter in `ctx`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, ctx: SalesContext) -> Self {
        Self {
            store: ScopedStore::new(db, ctx.owner_id()),
            ctx,
        }
    }

    fn filtered(&self) -> Scoped<'_, Entity> {
        self.store
            .sales_invoices()
            .refine(|q| apply_filter(q, self.ctx.filter()))
    }

    async fn query_summary(&self) -> Result<SalesSummary, RepositoryError> {
        let row = self
            .filtered()
            .refine(|q| {
                q.select_only()
                    .column_as(count_all(), "invoice_count")
                    .column_as(Expr::cust("COUNT(DISTINCT customer_name)"), "customer_count")
                    .column_as(total_of(Column::TaxableAmount), "taxable_total")
                    .column_as(tax_sum(), "tax_total")
                    .column_as(total_of(Column::TotalAmount), "grand_total")
                    .column_as(total_of(Column::ReceivedAmount), "received_total")
            })
            .one_as::<SummaryRow>()
            .await?
            .unwrap_or_default();

        Ok(SalesSummary {
            invoice_count: row.invoice_count,
            customer_count: row.customer_count,
            taxable_total: row.taxable_total,
            tax_total: row.tax_total,
            grand_total: row.grand_total,
            received_total: row.received_total,
            average_invoice_value: Decimal::ZERO,
        })
    }

    async fn query_region_breakup(&self) -> Result<Vec<SalesRegionBreakup>, RepositoryError> {
        let rows = self
            .filtered()
            .refine(|q| {
                q.select_only()
                    .column(Column::Region)
                    .column(Column::Zone)
                    .column_as(count_all(), "invoice_count")
                    .column_as(total_of(Column::TotalAmount), "total_amount")
                    .group_by(Column::Region)
                    .group_by(Column::Zone)
                    .order_by(total_of(Column::TotalAmount), Order::Desc)
            })
            .all_as::<RegionRow>()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SalesRegionBreakup {
                region: row
                    .region
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| UNASSIGNED_REGION.to_string()),
                zone: row.zone,
                invoice_count: row.invoice_count,
                total_amount: row.total_amount,
            })
            .collect())
    }

    async fn query_tax_breakup(&self) -> Result<Vec<TaxBreakup>, RepositoryError> {
        let row = self
            .filtered()
            .refine(|q| {
                q.select_only()
                    .column_as(total_of(Column::CgstAmount), "cgst")
                    .column_as(total_of(Column::SgstAmount), "sgst")
                    .column_as(total_of(Column::IgstAmount), "igst")
            })
            .one_as::<TaxRow>()
            .await?
            .unwrap_or_default();

        Ok(self
            .ctx
            .filter()
            .effective_tax_types()
            .into_iter()
            .map(|tax_type| TaxBreakup {
                tax_type,
                amount: row.amount(tax_type),
            })
            .collect())
    }

    async fn month_point(&self, window: &MonthWindow) -> Result<SalesMonthPoint, RepositoryError> {
        let row = self
            .filtered()
            .refine(|q| {
                q.filter(Column::InvoiceDate.gte(window.start))
                    .filter(Column::InvoiceDate.lt(window.end_exclusive))
                    .select_only()
                    .column_as(total_of(Column::TaxableAmount), "taxable")
                    .column_as(tax_sum(), "tax")
                    .column_as(total_of(Column::TotalAmount), "total")
            })
            .one_as::<MonthRow>()
            .await?
            .unwrap_or_default();

        Ok(SalesMonthPoint {
            month: window.label.clone(),
            taxable: row.taxable,
            tax: row.tax,
            total: row.total,
        })
    }

    async fn query_top_customers(&self, limit: u64) -> Result<Vec<SalesTopCustomer>, RepositoryError> {
        let rows = self
            .filtered()
            .refine(|q| {
                q.select_only()
                    .column(Column::CustomerName)
                    .column_as(count_all(), "invoice_count")
                    .column_as(total_of(Column::TotalAmount), "total_amount")
                    .column_as(total_of(Column::ReceivedAmount), "received_amount")
                    .group_by(Column::CustomerName)
                    .order_by(total_of(Column::TotalAmount), Order::Desc)
                    .limit(limit)
            })
            .all_as::<TopCustomerRow>()
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| SalesTopCustomer {
                customer_name: row.customer_name,
                invoice_count: row.invoice_count,
                total_amount: row.total_amount,
                received_amount: row.received_amount,
            })
            .collect())
    }

    async fn query_reconciliation(&self) -> Result<SalesReconciliation, RepositoryError> {
        let row = self
            .filtered()
            .refine(|q| {
                q.select_only()
                    .column_as(total_of(Column::TotalAmount), "invoiced_total")
                    .column_as(total_of(Column::ReceivedAmount), "received_total")
                    .column_as(count_all(), "invoice_count")
                    .column_as(
                        Expr::cust("COUNT(*) FILTER (WHERE received_amount >= total_amount)"),
                        "reconciled_count",
                    )
            })
            .one_as::<ReconciliationRow>()
            .await?
            .unwrap_or_default();

        Ok(SalesReconciliation::new(
            row.invoiced_total,
            row.received_total,
            row.reconciled_count,
            row.invoice_count - row.reconciled_count,
        ))
    }
}

#[async_trait]
impl SalesInvoiceSource for SalesInvoiceRepository {
    fn context(&self) -> &SalesContext {
        &self.ctx
    }

    async fn summary(&self) -> Result<SalesSummary, MetricsError> {
        Ok(self.query_summary().await?)
    }

    async fn region_breakup(&self) -> Result<Vec<SalesRegionBreakup>, MetricsError> {
        Ok(self.query_region_breakup().await?)
    }

    async fn tax_breakup(&self) -> Result<Vec<TaxBreakup>, MetricsError> {
        Ok(self.query_tax_breakup().await?)
    }

    async fn monthly_trend(&self, windows: &[MonthWindow]) -> Result<Vec<SalesMonthPoint>, MetricsError> {
        Ok(try_join_all(windows.iter().map(|w| self.month_point(w))).await?)
    }

    async fn top_customers(&self, limit: u64) -> Result<Vec<SalesTopCustomer>, MetricsError> {
        Ok(self.query_top_customers(limit).await?)
    }

    async fn reconciliation(&self) -> Result<SalesReconciliation, MetricsError> {
        Ok(self.query_reconciliation().await?)
    }
}
