//! User DTOs
//!
//! Wire names (`rol`, `lenguage`) are kept as existing clients send them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::RegisterUser;
use crate::domain::User;

/// Body of `POST /usuarios`. Absent, `null` and empty fields all fail
/// validation with the same message.
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Todos los campos son obligatorios"),
        length(min = 1, message = "Todos los campos son obligatorios")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "Todos los campos son obligatorios"),
        length(min = 1, message = "Todos los campos son obligatorios")
    )]
    pub password: Option<String>,
    #[serde(rename = "rol")]
    #[validate(
        required(message = "Todos los campos son obligatorios"),
        length(min = 1, message = "Todos los campos son obligatorios")
    )]
    pub role: Option<String>,
    #[serde(rename = "lenguage")]
    #[validate(
        required(message = "Todos los campos son obligatorios"),
        length(min = 1, message = "Todos los campos son obligatorios")
    )]
    pub language: Option<String>,
}

impl RegisterRequest {
    pub fn into_command(self) -> RegisterUser {
        RegisterUser {
            email: self.email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
        }
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("language", &self.language)
            .finish()
    }
}

/// One row of the self-lookup answer. The password hash has no field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub email: String,
    #[serde(rename = "rol")]
    pub role: String,
    #[serde(rename = "lenguage")]
    pub language: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            role: user.role,
            language: user.language,
        }
    }
}
