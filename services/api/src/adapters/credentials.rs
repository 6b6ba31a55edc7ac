//! services/api/src/adapters/credentials.rs
//!
//! Implementations of the `CredentialVerifier` port.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use kpi_counter_core::ports::{CredentialVerifier, PortError, PortResult, UserStore};
use std::sync::Arc;
use tracing::warn;

/// The user id a successful static login is bound to.
pub const ADMIN_USER_ID: u64 = 1;

//=========================================================================================
// Static Single-Pair Verifier
//=========================================================================================

/// Accepts exactly one configured username/password pair.
#[derive(Clone)]
pub struct StaticCredentialVerifier {
    username: String,
    password: String,
}

impl StaticCredentialVerifier {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, username: &str, password: &str) -> PortResult<Option<u64>> {
        // Both halves are always compared so a wrong username costs the same as a wrong password.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        Ok((user_ok & pass_ok).then_some(ADMIN_USER_ID))
    }
}

/// Constant-time byte comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

//=========================================================================================
// User-Store Verifier
//=========================================================================================

/// Verifies against argon2 hashes kept in a `UserStore`.
#[derive(Clone)]
pub struct UserStoreVerifier {
    users: Arc<dyn UserStore>,
}

impl UserStoreVerifier {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl CredentialVerifier for UserStoreVerifier {
    async fn verify(&self, username: &str, password: &str) -> PortResult<Option<u64>> {
        let Some(user) = self.users.get_user_by_username(username).await? else {
            return Ok(None);
        };

        let parsed_hash = match PasswordHash::new(&user.password_hash) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(user_id = user.id, "Stored password hash is unreadable: {:?}", e);
                return Ok(None);
            }
        };

        let valid = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();
        Ok(valid.then_some(user.id))
    }
}

/// Hashes a password into an argon2 PHC string suitable for `UserStore::create_user`.
pub fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}
