//! Core business logic for Finboard.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Storage is reached through the async source traits, which the database
//! crate implements.
//!
//! # Modules
//!
//! - `tenant` - Tenant context and date filters
//! - `dashboard` - Receivables dashboard: aging, trends, KPIs, assembly
//! - `sales` - Sales-invoice dashboard
//! - `sequence` - Invoice number format and allocation strategies

pub mod dashboard;
pub mod sales;
pub mod sequence;
pub mod tenant;

pub use tenant::{DateRange, MetricsFilter, OwnerId, TenantContext};
