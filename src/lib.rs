//! # Usuarios service
//!
//! Minimal user-account HTTP service: registration, password login issuing
//! a signed token, and token-authenticated lookup of the caller's profile.
//!
//! ## Architecture
//!
//! - **domain**: the user record, repository port and error types
//! - **application**: `UserService` with the register / login / profile use-cases
//! - **infrastructure**: password hashing, JWT, SeaORM and in-memory stores
//! - **interfaces**: axum router, handlers and the bearer-token middleware
//! - **server**: process lifecycle (pool, listener, graceful shutdown)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::{create_api_router, AppState};
