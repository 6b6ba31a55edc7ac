//! services/api/src/web/kpi.rs
//!
//! The session-gated dashboard read of all counters.

use axum::{extract::State, response::IntoResponse, Json};
use kpi_counter_core::domain::Counters;
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::web::state::AppState;

/// Wire form of a counter snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiData {
    pub total_calls: u64,
    pub deal_calls: u64,
    pub no_deal_calls: u64,
    pub positive_sentiment_calls: u64,
    pub negative_sentiment_calls: u64,
}

impl From<Counters> for KpiData {
    fn from(c: Counters) -> Self {
        Self {
            total_calls: c.total_calls,
            deal_calls: c.deal_calls,
            no_deal_calls: c.no_deal_calls,
            positive_sentiment_calls: c.positive_sentiment_calls,
            negative_sentiment_calls: c.negative_sentiment_calls,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct KpiResponse {
    pub success: bool,
    pub data: KpiData,
}

/// GET /api/kpi - Current counter snapshot (requires a session)
#[utoipa::path(
    get,
    path = "/api/kpi",
    responses(
        (status = 200, description = "Current counters", body = KpiResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 500, description = "Counter store failure", body = ErrorResponse)
    )
)]
pub async fn kpi_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let counters = state.counters.read().await.map_err(|e| {
        error!("Failed to read counters: {:?}", e);
        ApiError::Internal("Failed to fetch KPI data".to_string())
    })?;

    Ok(Json(KpiResponse {
        success: true,
        data: counters.into(),
    }))
}
