//! services/api/src/web/guard.rs
//!
//! The session guard: turns credentials into sessions and answers whether a
//! session id is currently authenticated.

use chrono::{Duration, Utc};
use kpi_counter_core::domain::AuthSession;
use kpi_counter_core::ports::{CredentialVerifier, PortResult, SessionStore};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Clone)]
pub struct SessionGuard {
    sessions: Arc<dyn SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
    ttl: Duration,
}

impl SessionGuard {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        verifier: Arc<dyn CredentialVerifier>,
        ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            verifier,
            ttl,
        }
    }

    /// Verifies the pair and, on success, stores a fresh session.
    ///
    /// Wrong username and wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthSession, ApiError> {
        let user_id = match self.verifier.verify(username, password).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                warn!("Rejected login attempt");
                return Err(ApiError::InvalidCredentials);
            }
            Err(e) => {
                error!("Credential verification failed: {:?}", e);
                return Err(ApiError::Internal("Login failed".to_string()));
            }
        };

        let session = AuthSession::new(Uuid::new_v4().to_string(), user_id, Utc::now(), self.ttl);
        self.sessions.create(&session).await.map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            ApiError::Internal("Login failed".to_string())
        })?;

        info!(user_id, "Login successful");
        Ok(session)
    }

    /// `true` only for a live, unexpired session. Store failures count as `false`.
    pub async fn check(&self, session_id: Option<&str>) -> bool {
        let Some(session_id) = session_id else {
            return false;
        };
        match self.sessions.is_authenticated(session_id).await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                error!("Failed to validate auth session: {:?}", e);
                false
            }
        }
    }

    /// Invalidates the session, if any. Already being logged out is not an error.
    pub async fn destroy(&self, session_id: Option<&str>) -> PortResult<()> {
        match session_id {
            Some(session_id) => self.sessions.destroy(session_id).await,
            None => Ok(()),
        }
    }
}
