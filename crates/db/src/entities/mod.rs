//! `SeaORM` entity definitions.

pub mod customers;
pub mod invoice_number_sequences;
pub mod invoices;
pub mod payments;
pub mod sales_invoice_master;
