//! User service, application-layer orchestration
//!
//! All user-related business logic lives here.
//! HTTP handlers are thin wrappers that delegate to this service.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface};
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::crypto::password::{hash_password, verify_password};

/// Registration input, plaintext password included.
#[derive(Clone)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub role: String,
    pub language: String,
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("language", &self.language)
            .finish()
    }
}

/// Authentication result returned after a successful login
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub token: String,
    pub user: User,
}

/// Orchestrates all identity use-cases.
///
/// Holds the repository port as a trait object so the same service runs
/// over PostgreSQL in production and over memory in tests.
pub struct UserService {
    repo: Arc<dyn UserRepositoryInterface>,
    jwt_config: JwtConfig,
    password_cost: u32,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepositoryInterface>,
        jwt_config: JwtConfig,
        password_cost: u32,
    ) -> Self {
        Self {
            repo,
            jwt_config,
            password_cost,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    pub fn repository(&self) -> &Arc<dyn UserRepositoryInterface> {
        &self.repo
    }

    // ── Registration ────────────────────────────────────────────

    /// Hash the password and store a new user.
    ///
    /// Every field must be non-empty. A duplicate email surfaces as
    /// `DomainError::Conflict` from the store.
    pub async fn register(&self, input: RegisterUser) -> DomainResult<()> {
        let missing = [
            ("email", &input.email),
            ("password", &input.password),
            ("rol", &input.role),
            ("lenguage", &input.language),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(DomainError::Validation(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        let cost = self.password_cost;
        let password = input.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| DomainError::Crypto(format!("hashing task failed: {}", e)))?
            .map_err(|e| DomainError::Crypto(format!("Failed to hash password: {}", e)))?;

        let dto = CreateUserDto {
            email: input.email.clone(),
            password_hash,
            role: input.role,
            language: input.language,
        };

        if let Err(e) = self.repo.create_user(dto).await {
            if let DomainError::Conflict(_) = e {
                warn!(email = %input.email, "Registration rejected: email already registered");
            }
            return Err(e);
        }

        info!(email = %input.email, "New user registered");
        Ok(())
    }

    // ── Authentication ──────────────────────────────────────────

    /// Check email + password and return a signed token.
    ///
    /// Unknown email and wrong password yield the same error.
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<AuthResult> {
        let Some(user) = self.repo.get_user_by_email(email).await? else {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        };

        let candidate = password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&candidate, &stored_hash))
            .await
            .map_err(|e| DomainError::Crypto(format!("verification task failed: {}", e)))?
            .unwrap_or_else(|e| {
                warn!(email = %user.email, error = %e, "Stored password hash is unreadable");
                false
            });

        if !valid {
            return Err(DomainError::Unauthorized("Invalid credentials".into()));
        }

        let token = create_token(&user.email, &self.jwt_config)
            .map_err(|e| DomainError::Crypto(format!("Failed to create token: {}", e)))?;

        info!(email = %user.email, "User logged in");
        Ok(AuthResult { token, user })
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Load the user a verified token points at.
    pub async fn profile(&self, email: &str) -> DomainResult<User> {
        self.repo
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity: "User",
                field: "email",
                value: email.to_string(),
            })
    }
}
