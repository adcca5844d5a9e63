//! Sales invoice master table backing the sales-invoice dashboard.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SALES_INVOICE_MASTER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS sales_invoice_master CASCADE;")
            .await?;
        Ok(())
    }
}

const SALES_INVOICE_MASTER_SQL: &str = r"
CREATE TABLE sales_invoice_master (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL,
    invoice_no VARCHAR(50) NOT NULL,
    invoice_date DATE NOT NULL,
    customer_name VARCHAR(255) NOT NULL,
    business_unit VARCHAR(100),
    region VARCHAR(100),
    zone VARCHAR(100),
    invoice_type VARCHAR(50),
    taxable_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    cgst_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    sgst_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    igst_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    received_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_sales_invoice_owner_no UNIQUE (owner_id, invoice_no)
);

CREATE INDEX idx_sales_invoice_owner_date ON sales_invoice_master(owner_id, invoice_date);
CREATE INDEX idx_sales_invoice_owner_customer ON sales_invoice_master(owner_id, customer_name);
";
