//! Domain layer
//!
//! The user aggregate, its repository port and the domain error type.
//! Nothing here depends on HTTP or on a concrete store.

pub mod error;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use user::{CreateUserDto, User, UserRepositoryInterface};
