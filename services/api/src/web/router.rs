//! services/api/src/web/router.rs
//!
//! Builds the complete HTTP application from an `AppState`.

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{
    auth::{login_handler, logout_handler, me_handler},
    ingest::{deal_handler, new_call_handler, sentiment_handler},
    kpi::kpi_handler,
    middleware::require_auth,
    rest::ApiDoc,
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/me", get(me_handler))
        .route("/new-call", post(new_call_handler))
        .route("/deals", post(deal_handler))
        .route("/sentiment", post(sentiment_handler));

    // Protected routes (session required)
    let protected_routes = Router::new()
        .route("/api/kpi", get(kpi_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let mut api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = state.config.cors_origin.as_deref() {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(origin)
                    .allow_credentials(true)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([CONTENT_TYPE, ACCEPT]);
                api_router = api_router.layer(cors);
            }
            Err(e) => warn!("Ignoring unusable CORS origin {:?}: {}", origin, e),
        }
    }

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router.with_state(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
