//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface};

/// In-memory user store for development and testing.
///
/// Keyed by email, so uniqueness holds the same way the `usuarios` unique
/// index enforces it.
pub struct InMemoryUserRepository {
    users: DashMap<String, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Drop a user behind the service's back. Lets tests model rows removed
    /// by another tool while tokens for them are still around.
    pub fn remove(&self, email: &str) -> Option<User> {
        self.users.remove(email).map(|(_, user)| user)
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryUserRepository {
    async fn create_user(&self, dto: CreateUserDto) -> DomainResult<()> {
        match self.users.entry(dto.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "email {} already registered",
                dto.email
            ))),
            Entry::Vacant(slot) => {
                slot.insert(User {
                    email: dto.email,
                    password_hash: dto.password_hash,
                    role: dto.role,
                    language: dto.language,
                });
                Ok(())
            }
        }
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }

    async fn ping(&self) -> DomainResult<()> {
        Ok(())
    }
}
