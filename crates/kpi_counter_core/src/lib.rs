pub mod domain;
pub mod ports;

pub use domain::{AuthSession, CounterField, CounterPatch, Counters, UnknownCounterField, User};
pub use ports::{CounterStore, CredentialVerifier, PortError, PortResult, SessionStore, UserStore};
