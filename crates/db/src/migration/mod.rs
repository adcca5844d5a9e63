//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_receivables;
mod m20260301_000002_sales_invoice_master;
mod m20260301_000003_invoice_number_sequences;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_receivables::Migration),
            Box::new(m20260301_000002_sales_invoice_master::Migration),
            Box::new(m20260301_000003_invoice_number_sequences::Migration),
        ]
    }
}
