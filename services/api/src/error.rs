//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered at the HTTP boundary.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kpi_counter_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, malformed, or out-of-enum request fields.
    #[error("Invalid request data: {0}")]
    InvalidPayload(String),

    /// The username/password pair was rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The request carries no valid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// An unexpected store or session failure. The message is what the client sees.
    #[error("{0}")]
    Internal(String),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error from running the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The JSON body sent for every failed request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            // Shape details stay in the logs.
            ApiError::InvalidPayload(_) => "Invalid request data".to_string(),
            ApiError::InvalidCredentials | ApiError::Unauthorized | ApiError::Internal(_) => {
                self.to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            success: false,
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
