//! Tenant-scoped query builders.
//!
//! A [`ScopedStore`] is the only way repositories reach tenant tables. Every
//! builder it hands out already carries the `owner_id` predicate, so a
//! repository cannot issue an unscoped read.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QuerySelect, RelationTrait, Select,
};

use finboard_shared::OwnerId;

use crate::entities::{customers, invoices, payments, sales_invoice_master};

/// Connection bound to a single tenant.
#[derive(Debug, Clone)]
pub struct ScopedStore {
    db: DatabaseConnection,
    owner_id: OwnerId,
}

impl ScopedStore {
    /// Binds `db` to `owner_id`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, owner_id: OwnerId) -> Self {
        Self { db, owner_id }
    }

    /// The tenant every query is restricted to.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// The tenant's invoices.
    pub fn invoices(&self) -> Scoped<'_, invoices::Entity> {
        self.scoped(
            invoices::Entity::find().filter(invoices::Column::OwnerId.eq(self.owner_id.into_inner())),
        )
    }

    /// The tenant's customers.
    pub fn customers(&self) -> Scoped<'_, customers::Entity> {
        self.scoped(
            customers::Entity::find()
                .filter(customers::Column::OwnerId.eq(self.owner_id.into_inner())),
        )
    }

    /// Payments against the tenant's invoices.
    pub fn payments(&self) -> Scoped<'_, payments::Entity> {
        self.scoped(
            payments::Entity::find()
                .join(JoinType::InnerJoin, payments::Relation::Invoices.def())
                .filter(invoices::Column::OwnerId.eq(self.owner_id.into_inner())),
        )
    }

    /// The tenant's sales invoice master rows.
    pub fn sales_invoices(&self) -> Scoped<'_, sales_invoice_master::Entity> {
        self.scoped(
            sales_invoice_master::Entity::find()
                .filter(sales_invoice_master::Column::OwnerId.eq(self.owner_id.into_inner())),
        )
    }

    fn scoped<E: EntityTrait>(&self, select: Select<E>) -> Scoped<'_, E> {
        Scoped {
            select,
            db: &self.db,
        }
    }
}

/// A select that already carries the tenant predicate.
///
/// Callers may narrow, project and order it but never widen it.
#[derive(Debug)]
pub struct Scoped<'a, E: EntityTrait> {
    select: Select<E>,
    db: &'a DatabaseConnection,
}

impl<E: EntityTrait> Scoped<'_, E> {
    /// Adds filters, joins, projections or ordering.
    #[must_use]
    pub fn refine(self, f: impl FnOnce(Select<E>) -> Select<E>) -> Self {
        Self {
            select: f(self.select),
            db: self.db,
        }
    }

    /// Number of matching rows.
    pub async fn count(self) -> Result<u64, DbErr> {
        let count: Option<i64> = self
            .select
            .select_only()
            .column_as(count_all(), "count")
            .into_tuple()
            .one(self.db)
            .await?;
        Ok(count.map_or(0, |n| u64::try_from(n).unwrap_or(0)))
    }

    /// All rows decoded as `M`.
    pub async fn all_as<M: FromQueryResult>(self) -> Result<Vec<M>, DbErr> {
        self.select.into_model::<M>().all(self.db).await
    }

    /// First row decoded as `M`.
    pub async fn one_as<M: FromQueryResult>(self) -> Result<Option<M>, DbErr> {
        self.select.into_model::<M>().one(self.db).await
    }
}

// ============================================================================
// Expression helpers
// ============================================================================

fn invoice_col(column: invoices::Column) -> Expr {
    Expr::col((invoices::Entity, column))
}

/// `CASE WHEN total > paid THEN total - paid ELSE 0 END` for invoices.
pub fn outstanding() -> SimpleExpr {
    Expr::case(
        open_balance(),
        invoice_col(invoices::Column::TotalAmount)
            .sub(invoice_col(invoices::Column::PaidAmount)),
    )
    .finally(Expr::val(Decimal::ZERO))
    .into()
}

/// Invoice still has money owed on it.
pub fn open_balance() -> SimpleExpr {
    invoice_col(invoices::Column::TotalAmount).gt(invoice_col(invoices::Column::PaidAmount))
}

/// Open balance that is past due as of `today`, or explicitly flagged overdue.
pub fn overdue(today: NaiveDate) -> SimpleExpr {
    let status = || invoice_col(invoices::Column::Status);
    open_balance().and(
        status().eq("overdue").or(invoice_col(invoices::Column::DueDate)
            .lt(today)
            .and(status().is_not_in(["paid", "cancelled"]))),
    )
}

/// `COALESCE(SUM(expr), 0)`.
pub fn sum_or_zero(expr: impl Into<SimpleExpr>) -> SimpleExpr {
    Func::coalesce([Func::sum(expr).into(), Expr::val(Decimal::ZERO).into()]).into()
}

/// `COUNT(*)`.
pub fn count_all() -> SimpleExpr {
    Expr::cust("COUNT(*)")
}

/// Qualified column reference usable inside aggregates.
pub fn col<E: EntityTrait>(entity: E, column: E::Column) -> SimpleExpr {
    Expr::col((entity, column)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(select: Select<invoices::Entity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_outstanding_clamps_at_zero() {
        let query = invoices::Entity::find()
            .select_only()
            .column_as(sum_or_zero(outstanding()), "outstanding");
        let text = sql(query);

        assert!(text.contains("CASE WHEN"));
        assert!(text.contains(r#""invoices"."total_amount" > "invoices"."paid_amount""#));
        assert!(text.contains("COALESCE(SUM("));
    }

    #[test]
    fn test_overdue_excludes_settled_statuses() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let text = sql(invoices::Entity::find().filter(overdue(today)));

        assert!(text.contains("'overdue'"));
        assert!(text.contains("NOT IN ('paid', 'cancelled')"));
        assert!(text.contains(r#""invoices"."due_date" < '2026-10-19'"#));
    }

    fn store(owner_id: OwnerId) -> ScopedStore {
        ScopedStore::new(DatabaseConnection::Disconnected, owner_id)
    }

    fn built<E: EntityTrait>(scoped: Scoped<'_, E>) -> String {
        scoped.select.build(DbBackend::Postgres).to_string()
    }

    fn owner_predicate(table: &str, owner_id: OwnerId) -> String {
        format!(r#""{table}"."owner_id" = '{owner_id}'"#)
    }

    #[test]
    fn test_invoices_are_owner_scoped() {
        let owner = OwnerId::new();
        let text = built(store(owner).invoices());

        assert!(text.contains(&owner_predicate("invoices", owner)));
    }

    #[test]
    fn test_customers_are_owner_scoped() {
        let owner = OwnerId::new();
        let text = built(store(owner).customers());

        assert!(text.contains(&owner_predicate("customers", owner)));
    }

    #[test]
    fn test_payments_are_scoped_through_their_invoice() {
        let owner = OwnerId::new();
        let text = built(store(owner).payments());

        assert!(text.contains(
            r#"INNER JOIN "invoices" ON "payments"."invoice_id" = "invoices"."id""#
        ));
        assert!(text.contains(&owner_predicate("invoices", owner)));
    }

    #[test]
    fn test_sales_invoices_are_owner_scoped() {
        let owner = OwnerId::new();
        let text = built(store(owner).sales_invoices());

        assert!(text.contains(&owner_predicate("sales_invoice_master", owner)));
    }

    #[test]
    fn test_refine_keeps_owner_predicate() {
        let owner = OwnerId::new();
        let text = built(
            store(owner)
                .invoices()
                .refine(|q| q.filter(invoices::Column::Status.eq("sent"))),
        );

        assert!(text.contains(&owner_predicate("invoices", owner)));
        assert!(text.contains(r#""invoices"."status" = 'sent'"#));
    }
}
