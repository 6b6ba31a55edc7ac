//! crates/kpi_counter_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific storage backends or credential sources.

use async_trait::async_trait;
use crate::domain::{AuthSession, CounterField, CounterPatch, Counters, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Holds the five KPI counters.
///
/// Implementations must serialize mutations: concurrent increments are never lost
/// or double-applied, and every returned snapshot reflects whole increments only.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Returns a copy of the current values.
    async fn read(&self) -> PortResult<Counters>;

    /// Adds one to `field` and returns the post-increment snapshot.
    async fn increment(&self, field: CounterField) -> PortResult<Counters>;

    /// Merges any subset of fields verbatim. Not reachable from any endpoint.
    async fn update(&self, patch: CounterPatch) -> PortResult<Counters>;
}

/// Server-side storage for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &AuthSession) -> PortResult<()>;

    /// `false` for unknown, destroyed, and expired sessions.
    async fn is_authenticated(&self, session_id: &str) -> PortResult<bool>;

    /// Destroying a session that does not exist is not an error.
    async fn destroy(&self, session_id: &str) -> PortResult<()>;
}

/// Generic user records keyed by numeric id.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: u64) -> PortResult<Option<User>>;

    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>>;

    /// Fails with `PortError::Conflict` if the username is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User>;
}

/// Decides whether a username/password pair may log in.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns the id of the authenticated user, or `None` on any mismatch.
    async fn verify(&self, username: &str, password: &str) -> PortResult<Option<u64>>;
}
