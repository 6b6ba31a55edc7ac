//! services/api/src/adapters/memory.rs
//!
//! In-process implementations of the storage ports. This is the default backing
//! store: everything lives for the lifetime of the process and is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use kpi_counter_core::domain::{AuthSession, CounterField, CounterPatch, Counters, User};
use kpi_counter_core::ports::{CounterStore, PortError, PortResult, SessionStore, UserStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> PortResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| PortError::Unexpected(format!("{} lock poisoned", what)))
}

//=========================================================================================
// Counters
//=========================================================================================

/// Holds the five counters behind a single mutex, so each increment is all-or-nothing.
#[derive(Default)]
pub struct InMemoryCounterStore {
    counters: Mutex<Counters>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn read(&self) -> PortResult<Counters> {
        Ok(*lock(&self.counters, "counter")?)
    }

    async fn increment(&self, field: CounterField) -> PortResult<Counters> {
        let mut counters = lock(&self.counters, "counter")?;
        counters.increment(field);
        Ok(*counters)
    }

    async fn update(&self, patch: CounterPatch) -> PortResult<Counters> {
        let mut counters = lock(&self.counters, "counter")?;
        counters.apply(&patch);
        Ok(*counters)
    }
}

//=========================================================================================
// Sessions
//=========================================================================================

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, AuthSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &AuthSession) -> PortResult<()> {
        let mut sessions = lock(&self.sessions, "session")?;
        let now = Utc::now();
        sessions.retain(|_, s| !s.is_expired_at(now));
        if sessions.contains_key(&session.id) {
            return Err(PortError::Conflict(format!("Session {} already exists", session.id)));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn is_authenticated(&self, session_id: &str) -> PortResult<bool> {
        let mut sessions = lock(&self.sessions, "session")?;
        let expired = match sessions.get(session_id) {
            Some(session) => session.is_expired_at(Utc::now()),
            None => return Ok(false),
        };
        if expired {
            sessions.remove(session_id);
        }
        Ok(!expired)
    }

    async fn destroy(&self, session_id: &str) -> PortResult<()> {
        lock(&self.sessions, "session")?.remove(session_id);
        Ok(())
    }
}

//=========================================================================================
// Users
//=========================================================================================

struct UserTable {
    users: HashMap<u64, User>,
    next_id: u64,
}

pub struct InMemoryUserStore {
    table: Mutex<UserTable>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(UserTable {
                users: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for InMemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, id: u64) -> PortResult<Option<User>> {
        Ok(lock(&self.table, "user")?.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<Option<User>> {
        let table = lock(&self.table, "user")?;
        Ok(table.users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        let mut table = lock(&self.table, "user")?;
        if table.users.values().any(|u| u.username == username) {
            return Err(PortError::Conflict(format!("Username {} is taken", username)));
        }

        let user = User {
            id: table.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        table.next_id += 1;
        table.users.insert(user.id, user.clone());
        Ok(user)
    }
}
