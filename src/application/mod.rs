//! Application layer: use cases orchestrating the domain and infrastructure

pub mod identity;

pub use identity::{AuthResult, RegisterUser, UserService};
