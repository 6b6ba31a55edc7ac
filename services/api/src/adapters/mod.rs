pub mod credentials;
pub mod db;
pub mod memory;

pub use credentials::{hash_password, StaticCredentialVerifier, UserStoreVerifier};
pub use db::DbAdapter;
pub use memory::{InMemoryCounterStore, InMemorySessionStore, InMemoryUserStore};
