//! Sales-invoice dashboard payload.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::filter::TaxType;

/// Headline totals over the filtered invoices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Matching invoices.
    pub invoice_count: i64,
    /// Distinct customer names.
    pub customer_count: i64,
    /// Σ taxable amount.
    pub taxable_total: Decimal,
    /// Σ CGST + SGST + IGST.
    pub tax_total: Decimal,
    /// Σ invoice total.
    pub grand_total: Decimal,
    /// Σ received amount.
    pub received_total: Decimal,
    /// `grand_total / invoice_count` to two places, 0 without invoices.
    pub average_invoice_value: Decimal,
}

impl SalesSummary {
    /// Fills in `average_invoice_value` from the totals.
    #[must_use]
    pub fn with_average(mut self) -> Self {
        self.average_invoice_value = if self.invoice_count > 0 {
            self.grand_total
                .checked_div(Decimal::from(self.invoice_count))
                .map_or(Decimal::ZERO, |avg| avg.round_dp(2))
        } else {
            Decimal::ZERO
        };
        self
    }
}

/// Totals for one region/zone pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesRegionBreakup {
    /// Region, `"Unassigned"` when blank.
    pub region: String,
    /// Zone, if recorded.
    pub zone: Option<String>,
    /// Matching invoices.
    pub invoice_count: i64,
    /// Σ invoice total.
    pub total_amount: Decimal,
}

/// Amount collected for one GST component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakup {
    /// Component.
    pub tax_type: TaxType,
    /// Σ component amount.
    pub amount: Decimal,
}

/// One month of sales-invoice totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesMonthPoint {
    /// Month label.
    pub month: String,
    /// Σ taxable amount.
    pub taxable: Decimal,
    /// Σ tax.
    pub tax: Decimal,
    /// Σ invoice total.
    pub total: Decimal,
}

/// Customer ranked by invoiced amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTopCustomer {
    /// Customer name as recorded on the invoice.
    pub customer_name: String,
    /// Matching invoices.
    pub invoice_count: i64,
    /// Σ invoice total.
    pub total_amount: Decimal,
    /// Σ received amount.
    pub received_amount: Decimal,
}

/// Invoiced versus received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReconciliation {
    /// Σ invoice total.
    pub invoiced_total: Decimal,
    /// Σ received amount.
    pub received_total: Decimal,
    /// `max(invoiced - received, 0)`.
    pub pending_total: Decimal,
    /// Invoices fully received.
    pub reconciled_count: i64,
    /// Invoices with a balance left.
    pub unreconciled_count: i64,
}

impl SalesReconciliation {
    /// Builds the section, deriving the pending amount.
    #[must_use]
    pub fn new(
        invoiced_total: Decimal,
        received_total: Decimal,
        reconciled_count: i64,
        unreconciled_count: i64,
    ) -> Self {
        Self {
            invoiced_total,
            received_total,
            pending_total: (invoiced_total - received_total).max(Decimal::ZERO),
            reconciled_count,
            unreconciled_count,
        }
    }
}

/// Complete sales-invoice dashboard payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInvoiceSnapshot {
    /// Evaluation instant.
    pub generated_at: DateTime<Utc>,
    /// Headline totals.
    pub summary: SalesSummary,
    /// Per region/zone totals.
    pub region_breakup: Vec<SalesRegionBreakup>,
    /// Per GST component totals.
    pub tax_breakup: Vec<TaxBreakup>,
    /// Monthly totals, oldest first.
    pub monthly_trend: Vec<SalesMonthPoint>,
    /// Customers with the largest invoiced amount.
    pub top_customers: Vec<SalesTopCustomer>,
    /// Invoiced versus received.
    pub reconciliation: SalesReconciliation,
}

impl SalesInvoiceSnapshot {
    /// The all-zero snapshot.
    #[must_use]
    pub fn zeroed(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            summary: SalesSummary::default(),
            region_breakup: Vec::new(),
            tax_breakup: Vec::new(),
            monthly_trend: Vec::new(),
            top_customers: Vec::new(),
            reconciliation: SalesReconciliation::default(),
        }
    }
}
