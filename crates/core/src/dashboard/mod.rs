//! Financial dashboard metrics.
//!
//! This module turns tenant-scoped storage reads into a complete
//! [`DashboardSnapshot`]:
//! - Aging buckets keyed on due date
//! - Rolling monthly, two-month and cash-inflow series
//! - Derived collection KPIs (DSO, CEI, ...)
//! - Two-batch assembly with per-section fault isolation

pub mod aging;
pub mod assembler;
pub mod kpi;
pub mod source;
pub mod trends;
pub mod types;

#[cfg(test)]
mod aging_props;
#[cfg(test)]
mod kpi_props;
#[cfg(test)]
mod memory;

pub use aging::{AgingBucket, AgingBucketCalculator, AgingLabel, AgingWindow};
pub use assembler::{
    AssembledDashboard, AssemblyOutcome, DashboardAssembler, DashboardLimits, Section,
    SectionReport, SectionStatus,
};
pub use kpi::{DerivedMetricsCalculator, round_half_up};
pub use source::{MetricsError, MetricsSource};
pub use trends::{MonthWindow, TrendSeriesBuilder};
pub use types::*;
