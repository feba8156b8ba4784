use async_trait::async_trait;

use super::{CreateUserDto, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Insert a new user. A second row with the same email must fail with
    /// `DomainError::Conflict`.
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<()>;

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Round-trip to the store, used by the health endpoint.
    async fn ping(&self) -> DomainResult<()>;
}
