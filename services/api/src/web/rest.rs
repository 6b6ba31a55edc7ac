//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::web::auth::{self, AuthStatusResponse, LoginRequest, MessageResponse};
use crate::web::ingest::{
    self, DealOutcome, DealRequest, DealResponse, NewCallResponse, Sentiment, SentimentRequest,
    SentimentResponse,
};
use crate::web::kpi::{self, KpiData, KpiResponse};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        kpi::kpi_handler,
        ingest::new_call_handler,
        ingest::deal_handler,
        ingest::sentiment_handler,
    ),
    components(
        schemas(
            LoginRequest, MessageResponse, AuthStatusResponse, ErrorResponse,
            KpiData, KpiResponse,
            DealOutcome, DealRequest, DealResponse,
            Sentiment, SentimentRequest, SentimentResponse,
            NewCallResponse,
        )
    ),
    tags(
        (name = "KPI Dashboard API", description = "Call-tracking ingestion and the authenticated dashboard read path.")
    )
)]
pub struct ApiDoc;
