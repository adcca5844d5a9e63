//! Dashboard routes.
//!
//! The receivables snapshot, its server-sent event stream and the
//! sales-invoice dashboard. All three are tenant scoped through [`AuthUser`].

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::{MissedTickBehavior, interval};
use tokio_stream::wrappers::IntervalStream;
use tracing::{info, warn};

use crate::{ApiError, AppState, middleware::AuthUser};
use finboard_core::dashboard::{
    DashboardAssembler, DashboardLimits, DashboardSnapshot, MetricsSource,
};
use finboard_core::sales::{
    SalesContext, SalesDashboardAssembler, SalesFilterParams, SalesInvoiceFilter,
    SalesInvoiceSnapshot,
};
use finboard_core::{MetricsFilter, OwnerId, TenantContext};
use finboard_db::{MetricsRepository, SalesInvoiceRepository};
use finboard_shared::{AppError, DashboardConfig};

/// Creates the dashboard routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/events", get(dashboard_events))
        .route("/dashboard/sales-invoice", get(get_sales_invoice_dashboard))
}

// ============================================================================
// Query Parameters & Responses
// ============================================================================

/// Query parameters for the receivables dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// `15d`, `30d`, `45d`, `60d`, `90d` or any `<N>d`.
    pub range: Option<String>,
}

/// Envelope shared by the dashboard endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse<T> {
    /// Always true; failures are reported through status codes.
    pub success: bool,
    /// The snapshot.
    pub data: T,
    /// True when the tenant owns any data.
    pub has_data: bool,
    /// The tenant the snapshot belongs to.
    pub user_id: OwnerId,
}

fn limits(config: &DashboardConfig) -> DashboardLimits {
    DashboardLimits {
        recent_invoices: config.recent_invoice_limit,
        top_customers: config.top_customer_limit,
    }
}

fn tenant_context(owner_id: OwnerId, range: Option<&str>, config: &DashboardConfig) -> TenantContext {
    let now = Utc::now();
    TenantContext::new(
        owner_id,
        MetricsFilter::from_range_param(range, now, config.default_range_days),
        now,
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /dashboard
async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    AuthUser(owner_id): AuthUser,
) -> Result<Json<DashboardResponse<DashboardSnapshot>>, ApiError> {
    let db = state.require_storage().await?;
    let ctx = tenant_context(owner_id, query.range.as_deref(), &state.dashboard);

    let assembled = DashboardAssembler::new(limits(&state.dashboard))
        .assemble(&MetricsRepository::new(db, ctx))
        .await;

    Ok(Json(DashboardResponse {
        success: true,
        data: assembled.snapshot,
        has_data: assembled.has_data,
        user_id: owner_id,
    }))
}

/// GET /dashboard/events
///
/// Pushes a full snapshot on connect and then every refresh interval.
async fn dashboard_events(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
    AuthUser(owner_id): AuthUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let db = state.require_storage().await?;
    let config = Arc::clone(&state.dashboard);
    let assembler = DashboardAssembler::new(limits(&config));
    let period = Duration::from_secs(config.refresh_interval_secs.max(1));

    info!(owner_id = %owner_id, range = ?query.range, "Dashboard stream opened");

    let events = snapshot_events(
        move || {
            let ctx = tenant_context(owner_id, query.range.as_deref(), &config);
            MetricsRepository::new(db.clone(), ctx)
        },
        assembler,
        period,
    );

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// One `update` event per tick of `period`, the first one immediately.
///
/// Every tick reassembles the dashboard from a fresh source so the context
/// clock moves with the stream.
pub fn snapshot_events<S, F>(
    mut make_source: F,
    assembler: DashboardAssembler,
    period: Duration,
) -> impl Stream<Item = Result<Event, Infallible>> + Send + 'static
where
    F: FnMut() -> S + Send + 'static,
    S: MetricsSource + 'static,
{
    let mut ticks = interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    IntervalStream::new(ticks)
        .then(move |_| {
            let source = make_source();
            async move { assembler.assemble(&source).await.snapshot }
        })
        .filter_map(|snapshot| async move {
            match Event::default().event("update").json_data(&snapshot) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!(error = %e, "Failed to encode dashboard event");
                    None
                }
            }
        })
}

/// GET /dashboard/sales-invoice
async fn get_sales_invoice_dashboard(
    State(state): State<AppState>,
    Query(params): Query<SalesFilterParams>,
    AuthUser(owner_id): AuthUser,
) -> Result<Json<DashboardResponse<SalesInvoiceSnapshot>>, ApiError> {
    let filter =
        SalesInvoiceFilter::parse(params).map_err(|e| ApiError(AppError::Validation(e.to_string())))?;
    let db = state.require_storage().await?;
    let ctx = SalesContext::new(owner_id, filter, Utc::now());

    let assembled = SalesDashboardAssembler::new(state.dashboard.top_customer_limit)
        .assemble(&SalesInvoiceRepository::new(db, ctx))
        .await;

    Ok(Json(DashboardResponse {
        success: true,
        data: assembled.snapshot,
        has_data: assembled.has_data,
        user_id: owner_id,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::response::IntoResponse;
    use finboard_core::dashboard::{
        AgingBucket, BaseKpis, CashInflowPoint, CustomerOutstanding, MetricsError, MonthWindow,
        OverdueCustomer, Reconciliation, RecentInvoice, RegionalBreakup, TrendPoint,
    };
    use http_body_util::BodyExt;
    use tokio::time::Instant;

    use super::*;

    /// Source whose store is down; the assembler falls back to a zeroed snapshot.
    struct OfflineSource(TenantContext);

    fn offline<T>() -> Result<T, MetricsError> {
        Err(MetricsError::Storage("offline".to_string()))
    }

    #[async_trait]
    impl MetricsSource for OfflineSource {
        fn context(&self) -> &TenantContext {
            &self.0
        }
        async fn kpis(&self) -> Result<BaseKpis, MetricsError> {
            offline()
        }
        async fn recent_invoices(&self, _limit: u64) -> Result<Vec<RecentInvoice>, MetricsError> {
            offline()
        }
        async fn top_customers_by_outstanding(
            &self,
            _limit: u64,
        ) -> Result<Vec<CustomerOutstanding>, MetricsError> {
            offline()
        }
        async fn has_data(&self) -> Result<bool, MetricsError> {
            offline()
        }
        async fn aging_analysis(&self) -> Result<Vec<AgingBucket>, MetricsError> {
            offline()
        }
        async fn regional_breakup(&self) -> Result<Vec<RegionalBreakup>, MetricsError> {
            offline()
        }
        async fn monthly_trends(&self, _windows: &[MonthWindow]) -> Result<Vec<TrendPoint>, MetricsError> {
            offline()
        }
        async fn top_customers_by_overdue(
            &self,
            _limit: u64,
        ) -> Result<Vec<OverdueCustomer>, MetricsError> {
            offline()
        }
        async fn cash_inflow_comparison(
            &self,
            _windows: &[MonthWindow],
        ) -> Result<Vec<CashInflowPoint>, MetricsError> {
            offline()
        }
        async fn reconciliation(&self) -> Result<Reconciliation, MetricsError> {
            offline()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_push_on_connect_then_every_period() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&builds);
        let ctx = tenant_context(OwnerId::new(), Some("30d"), &DashboardConfig::default());

        let events = snapshot_events(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                OfflineSource(ctx.clone())
            },
            DashboardAssembler::new(limits(&DashboardConfig::default())),
            Duration::from_secs(10),
        );
        let mut body = Sse::new(events).into_response().into_body();
        let start = Instant::now();

        let first = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        let text = String::from_utf8(first.to_vec()).unwrap();
        assert!(text.starts_with("event: update\ndata: {"));
        assert!(text.ends_with("\n\n"));

        let second = body.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(start.elapsed().as_secs(), 10);
        assert!(String::from_utf8(second.to_vec()).unwrap().starts_with("event: update\n"));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
