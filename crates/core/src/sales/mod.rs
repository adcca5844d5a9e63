//! Sales-invoice dashboard.
//!
//! Filtered analytics over the sales invoice master: summary totals,
//! region/zone and GST breakups, monthly trend, top customers and
//! invoiced-versus-received reconciliation.

pub mod assembler;
pub mod filter;
pub mod source;
pub mod types;

pub use assembler::{AssembledSalesDashboard, SalesDashboardAssembler, SalesSection};
pub use filter::{FilterError, SalesFilterParams, SalesInvoiceFilter, TaxType};
pub use source::{SalesContext, SalesInvoiceSource};
pub use types::*;
