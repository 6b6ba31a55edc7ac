pub mod auth;
pub mod cookie;
pub mod extract;
pub mod guard;
pub mod ingest;
pub mod kpi;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;

// Re-export what the binary needs to build the web server.
pub use router::build_router;
pub use state::AppState;
