//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that lets the request through only if its session cookie names a
/// live session. Otherwise responds 401 without touching the handler.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session_id = state.cookie.session_id(req.headers());

    if !state.guard.check(session_id.as_deref()).await {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
