//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for dashboard login, logout, and session status.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::error::{ApiError, ErrorResponse};
use crate::web::extract::{Payload, SessionToken};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthStatusResponse {
    pub success: bool,
    pub authenticated: bool,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/auth/login - Login with the dashboard credentials
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets the session cookie", body = MessageResponse),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Session could not be created", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    SessionToken(previous): SessionToken,
    Payload(req): Payload<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Shape check
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::InvalidPayload(
            "username and password are required".to_string(),
        ));
    }

    // 2. Verify credentials and open a session
    let session = state.guard.authenticate(&req.username, &req.password).await?;

    // 3. Drop whatever session the client held before
    if previous.is_some() {
        if let Err(e) = state.guard.destroy(previous.as_deref()).await {
            warn!("Failed to destroy replaced session: {:?}", e);
        }
    }

    // 4. Return response with cookie
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.cookie.set_cookie(&session.id))],
        Json(MessageResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    ))
}

/// POST /api/auth/logout - Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful; clears the session cookie", body = MessageResponse),
        (status = 500, description = "Session could not be destroyed", body = ErrorResponse)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    SessionToken(session_id): SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    state
        .guard
        .destroy(session_id.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            ApiError::Internal("Logout failed".to_string())
        })?;

    if session_id.is_some() {
        info!("Logout successful");
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, state.cookie.clear_cookie())],
        Json(MessageResponse {
            success: true,
            message: "Logout successful".to_string(),
        }),
    ))
}

/// GET /api/auth/me - Report whether the caller holds a valid session
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Authenticated", body = AuthStatusResponse),
        (status = 401, description = "Not authenticated", body = AuthStatusResponse)
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    SessionToken(session_id): SessionToken,
) -> Response {
    let authenticated = state.guard.check(session_id.as_deref()).await;
    let status = if authenticated {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };

    (
        status,
        Json(AuthStatusResponse {
            success: authenticated,
            authenticated,
        }),
    )
        .into_response()
}
