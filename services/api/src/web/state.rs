//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{
    InMemoryCounterStore, InMemorySessionStore, InMemoryUserStore, StaticCredentialVerifier,
};
use crate::config::{Config, ConfigError};
use crate::web::cookie::SessionCookie;
use crate::web::guard::SessionGuard;
use kpi_counter_core::ports::{CounterStore, CredentialVerifier, SessionStore, UserStore};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub counters: Arc<dyn CounterStore>,
    /// Generic user records. No endpoint reads them.
    pub users: Arc<dyn UserStore>,
    pub guard: SessionGuard,
    pub cookie: SessionCookie,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the given stores together with the cookie and guard derived from `config`.
    pub fn new(
        config: Config,
        counters: Arc<dyn CounterStore>,
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserStore>,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, ConfigError> {
        let cookie = SessionCookie::from_config(&config)?;
        let guard = SessionGuard::new(sessions, verifier, config.session_ttl());
        Ok(Self {
            counters,
            users,
            guard,
            cookie,
            config: Arc::new(config),
        })
    }

    /// Fresh in-memory stores with the configured admin pair. All counters start at zero.
    pub fn in_memory(config: Config) -> Result<Self, ConfigError> {
        let verifier = Arc::new(StaticCredentialVerifier::new(
            config.admin_username.clone(),
            config.admin_password.clone(),
        ));
        Self::new(
            config,
            Arc::new(InMemoryCounterStore::new()),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryUserStore::new()),
            verifier,
        )
    }
}
