//! # Nearly API Server
//!
//! Actix-web application for the Nearly hyperlocal social network. The
//! binary in `main.rs` wires these modules together; integration tests
//! build the same app against in-memory state.

#[cfg(feature = "scheduler")]
pub mod background;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use config::AppConfig;
pub use handlers::configure_routes;
pub use state::AppState;
