//! Invoice number allocation endpoint.

use axum::{Json, Router, extract::State, routing::post};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;

use crate::{ApiError, AppState, middleware::AuthUser};
use finboard_core::sequence::{Allocation, SequenceError};
use finboard_shared::AppError;

/// Allocation request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateRequest {
    /// Issue date; defaults to today.
    pub issue_date: Option<NaiveDate>,
}

impl From<SequenceError> for ApiError {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::Collision { .. } => Self(AppError::Conflict(err.to_string())),
            SequenceError::Storage(_) => Self(AppError::Database(err.to_string())),
        }
    }
}

/// POST /invoice-numbers
async fn allocate_invoice_number(
    State(state): State<AppState>,
    AuthUser(owner_id): AuthUser,
    Json(body): Json<AllocateRequest>,
) -> Result<Json<Allocation>, ApiError> {
    let issue_date = body.issue_date.unwrap_or_else(|| Utc::now().date_naive());
    let allocation = state.allocator.next(issue_date).await?;

    info!(
        owner_id = %owner_id,
        invoice_number = %allocation.invoice_number,
        mode = ?allocation.mode,
        "Invoice number allocated"
    );
    Ok(Json(allocation))
}

/// Creates invoice number routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/invoice-numbers", post(allocate_invoice_number))
}
