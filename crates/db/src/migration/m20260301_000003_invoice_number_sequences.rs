//! Per-year invoice number counter.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INVOICE_NUMBER_SEQUENCES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS invoice_number_sequences;")
            .await?;
        Ok(())
    }
}

const INVOICE_NUMBER_SEQUENCES_SQL: &str = r"
CREATE TABLE invoice_number_sequences (
    year INTEGER PRIMARY KEY,
    last_value BIGINT NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_sequence_positive CHECK (last_value >= 0)
);
";
