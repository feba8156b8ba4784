//! Identity module: registration, login and self-lookup
//!
//! Contains the `UserService` which orchestrates all user-related use-cases.

pub mod service;

pub use service::{AuthResult, RegisterUser, UserService};
