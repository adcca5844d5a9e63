//! Demo data seeder for Finboard development.
//!
//! Seeds one demo tenant with customers, invoices, payments and sales
//! invoices so both dashboards have something to show.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use finboard_db::entities::{customers, payments, sales_invoice_master};
use finboard_db::{NewInvoice, SequenceRepository};
use finboard_shared::OwnerId;

/// Demo tenant (consistent for all seeds).
const DEMO_OWNER_ID: Uuid = Uuid::from_u128(1);

const CUSTOMERS: [(&str, Option<&str>); 5] = [
    ("Acme Traders", Some("North")),
    ("Blue River Foods", Some("South")),
    ("Cobalt Systems", Some("West")),
    ("Delta Logistics", Some("North")),
    ("Evergreen Retail", None),
];

/// (customer index, days since issue, payment terms in days, total, paid)
const INVOICES: [(usize, i64, i64, i64, i64); 14] = [
    (0, 5, 30, 120_000, 0),
    (0, 20, 30, 85_000, 85_000),
    (0, 75, 30, 64_000, 20_000),
    (1, 10, 15, 42_500, 0),
    (1, 40, 30, 150_000, 150_000),
    (1, 130, 30, 31_000, 0),
    (2, 2, 30, 99_900, 0),
    (2, 28, 14, 47_250, 47_250),
    (2, 55, 30, 210_000, 100_000),
    (3, 12, 30, 18_000, 18_000),
    (3, 33, 7, 27_400, 0),
    (3, 100, 30, 75_500, 75_500),
    (4, 8, 30, 54_000, 10_000),
    (4, 66, 30, 12_750, 0),
];

/// (customer, business unit, region, zone, invoice type, days ago, taxable, received)
const SALES: [(&str, &str, &str, &str, &str, i64, i64, i64); 10] = [
    ("Acme Traders", "Hardware", "North", "N1", "B2B", 3, 100_000, 118_000),
    ("Acme Traders", "Hardware", "North", "N1", "B2B", 35, 40_000, 0),
    ("Blue River Foods", "Grocery", "South", "S2", "B2B", 7, 75_000, 40_000),
    ("Blue River Foods", "Grocery", "South", "S2", "B2C", 62, 12_000, 14_160),
    ("Cobalt Systems", "Services", "West", "W1", "B2B", 14, 250_000, 295_000),
    ("Cobalt Systems", "Services", "West", "W3", "Export", 90, 180_000, 0),
    ("Delta Logistics", "Freight", "North", "N2", "B2B", 21, 60_000, 70_800),
    ("Delta Logistics", "Freight", "East", "E1", "B2B", 48, 33_000, 0),
    ("Evergreen Retail", "Retail", "", "", "B2C", 1, 9_500, 11_210),
    ("Evergreen Retail", "Retail", "South", "S1", "B2C", 120, 15_000, 17_700),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = finboard_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    let existing = customers::Entity::find()
        .filter(customers::Column::OwnerId.eq(DEMO_OWNER_ID))
        .count(&db)
        .await?;
    if existing > 0 {
        println!("Demo tenant already seeded, skipping...");
        return Ok(());
    }

    let today = Utc::now().date_naive();

    println!("Seeding customers...");
    let customer_ids = seed_customers(&db).await?;

    println!("Seeding invoices and payments...");
    seed_invoices(&db, &customer_ids, today).await?;

    println!("Seeding sales invoices...");
    seed_sales_invoices(&db, today).await?;

    println!("Seeding complete! Demo tenant: {DEMO_OWNER_ID}");
    Ok(())
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

async fn seed_customers(db: &DatabaseConnection) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, region) in CUSTOMERS {
        let customer = customers::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(DEMO_OWNER_ID),
            company_name: Set(name.to_string()),
            region: Set(region.map(str::to_string)),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
        println!("  Created customer: {name}");
        ids.push(customer.id);
    }
    Ok(ids)
}

fn status_for(total: Decimal, paid: Decimal, due_date: NaiveDate, today: NaiveDate) -> &'static str {
    if paid >= total {
        "paid"
    } else if due_date < today {
        "overdue"
    } else if paid > Decimal::ZERO {
        "partial"
    } else {
        "sent"
    }
}

async fn seed_invoices(
    db: &DatabaseConnection,
    customer_ids: &[Uuid],
    today: NaiveDate,
) -> anyhow::Result<()> {
    let sequence = SequenceRepository::new(db.clone());

    for (customer, age, terms, total, paid) in INVOICES {
        let issue_date = today - Duration::days(age);
        let due_date = issue_date + Duration::days(terms);
        let (total, paid) = (money(total), money(paid));

        let invoice = sequence
            .create_invoice(NewInvoice {
                owner_id: OwnerId::from_uuid(DEMO_OWNER_ID),
                customer_id: customer_ids[customer],
                issue_date,
                due_date,
                total_amount: total,
                paid_amount: paid,
                status: status_for(total, paid, due_date, today).to_string(),
            })
            .await?;

        if paid > Decimal::ZERO {
            payments::ActiveModel {
                id: Set(Uuid::now_v7()),
                invoice_id: Set(invoice.id),
                amount: Set(paid),
                payment_date: Set((issue_date + Duration::days(terms / 2)).min(today)),
                created_at: Set(Utc::now().into()),
            }
            .insert(db)
            .await?;
        }

        println!("  Created invoice: {}", invoice.invoice_number);
    }
    Ok(())
}

async fn seed_sales_invoices(db: &DatabaseConnection, today: NaiveDate) -> anyhow::Result<()> {
    for (n, (customer, unit, region, zone, kind, age, taxable, received)) in
        SALES.into_iter().enumerate()
    {
        let taxable = money(taxable);
        // Exports carry no GST; interstate sales in the West and East pay IGST.
        let (cgst, sgst, igst) = match (kind, region) {
            ("Export", _) => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
            (_, "West" | "East") => (Decimal::ZERO, Decimal::ZERO, taxable * Decimal::new(18, 2)),
            _ => {
                let half = taxable * Decimal::new(9, 2);
                (half, half, Decimal::ZERO)
            }
        };
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());

        sales_invoice_master::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(DEMO_OWNER_ID),
            invoice_no: Set(format!("SI-{:04}", n + 1)),
            invoice_date: Set(today - Duration::days(age)),
            customer_name: Set(customer.to_string()),
            business_unit: Set(Some(unit.to_string())),
            region: Set(optional(region)),
            zone: Set(optional(zone)),
            invoice_type: Set(Some(kind.to_string())),
            taxable_amount: Set(taxable),
            cgst_amount: Set(cgst),
            sgst_amount: Set(sgst),
            igst_amount: Set(igst),
            total_amount: Set(taxable + cgst + sgst + igst),
            received_amount: Set(money(received)),
            created_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
    }
    println!("  Created {} sales invoices", SALES.len());
    Ok(())
}
