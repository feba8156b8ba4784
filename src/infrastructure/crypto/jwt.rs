//! JWT Token handling

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token lifetime in hours. `None` issues tokens without an `exp` claim.
    pub expiration_hours: Option<i64>,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: Option<i64>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// JWT TokenClaims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    /// Email of the authenticated user
    pub email: String,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TokenClaims {
    pub fn new(email: &str, config: &JwtConfig) -> Self {
        let now = Utc::now();

        Self {
            email: email.to_string(),
            iat: Some(now.timestamp()),
            exp: config
                .expiration_hours
                .map(|hours| (now + Duration::hours(hours)).timestamp()),
        }
    }
}

/// Create a JWT token carrying the `email` claim
pub fn create_token(email: &str, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let token_claims = TokenClaims::new(email, config);

    encode(
        &Header::new(Algorithm::HS256),
        &token_claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token.
///
/// `exp` is optional, but when present it is enforced.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    validation.validate_exp = true;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
