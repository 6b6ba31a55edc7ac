//! services/api/src/web/ingest.rs
//!
//! Public endpoints that call-tracking systems post events to. They carry no
//! session check: external integrations never hold a dashboard login.

use axum::{extract::State, response::IntoResponse, Json};
use kpi_counter_core::domain::{CounterField, Counters};
use kpi_counter_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::web::extract::Payload;
use crate::web::state::AppState;

//=========================================================================================
// Payloads
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum DealOutcome {
    #[serde(rename = "Deal")]
    Deal,
    #[serde(rename = "No Deal")]
    NoDeal,
}

impl DealOutcome {
    fn field(self) -> CounterField {
        match self {
            DealOutcome::Deal => CounterField::Deal,
            DealOutcome::NoDeal => CounterField::NoDeal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    fn field(self) -> CounterField {
        match self {
            Sentiment::Positive => CounterField::PositiveSentiment,
            Sentiment::Negative => CounterField::NegativeSentiment,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct DealRequest {
    pub deal: DealOutcome,
}

#[derive(Deserialize, ToSchema)]
pub struct SentimentRequest {
    pub sentiment: Sentiment,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCallResponse {
    pub success: bool,
    pub total_calls: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealResponse {
    pub success: bool,
    pub deal_calls: u64,
    pub no_deal_calls: u64,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResponse {
    pub success: bool,
    pub positive_sentiment_calls: u64,
    pub negative_sentiment_calls: u64,
}

//=========================================================================================
// Handlers
//=========================================================================================

async fn record(state: &AppState, field: CounterField, failure: &str) -> Result<Counters, ApiError> {
    state.counters.increment(field).await.map_err(|e: PortError| {
        error!(%field, "Failed to increment counter: {:?}", e);
        ApiError::Internal(failure.to_string())
    })
}

/// POST /new-call - Count one call
#[utoipa::path(
    post,
    path = "/new-call",
    responses(
        (status = 200, description = "Call counted", body = NewCallResponse),
        (status = 500, description = "Counter store failure", body = ErrorResponse)
    )
)]
pub async fn new_call_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let counters = record(&state, CounterField::Total, "Failed to increment total calls").await?;
    info!(total_calls = counters.total_calls, "New call recorded");

    Ok(Json(NewCallResponse {
        success: true,
        total_calls: counters.total_calls,
    }))
}

/// POST /deals - Record a call's deal outcome
#[utoipa::path(
    post,
    path = "/deals",
    request_body = DealRequest,
    responses(
        (status = 200, description = "Outcome counted", body = DealResponse),
        (status = 400, description = "`deal` missing or not \"Deal\"/\"No Deal\"", body = ErrorResponse),
        (status = 500, description = "Counter store failure", body = ErrorResponse)
    )
)]
pub async fn deal_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<DealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let field = req.deal.field();
    let counters = record(&state, field, "Failed to record deal outcome").await?;
    info!(%field, "Deal outcome recorded");

    Ok(Json(DealResponse {
        success: true,
        deal_calls: counters.deal_calls,
        no_deal_calls: counters.no_deal_calls,
    }))
}

/// POST /sentiment - Record a call's sentiment
#[utoipa::path(
    post,
    path = "/sentiment",
    request_body = SentimentRequest,
    responses(
        (status = 200, description = "Sentiment counted", body = SentimentResponse),
        (status = 400, description = "`sentiment` missing or not \"Positive\"/\"Negative\"", body = ErrorResponse),
        (status = 500, description = "Counter store failure", body = ErrorResponse)
    )
)]
pub async fn sentiment_handler(
    State(state): State<Arc<AppState>>,
    Payload(req): Payload<SentimentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let field = req.sentiment.field();
    let counters = record(&state, field, "Failed to record sentiment").await?;
    info!(%field, "Sentiment recorded");

    Ok(Json(SentimentResponse {
        success: true,
        positive_sentiment_calls: counters.positive_sentiment_calls,
        negative_sentiment_calls: counters.negative_sentiment_calls,
    }))
}
