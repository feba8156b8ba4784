//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};
use crate::interfaces::http::common::messages::{TOKEN_INVALID, TOKEN_MISSING};
use crate::interfaces::http::common::ApiError;

/// Authentication error types
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
}

/// State the middleware needs: only the verification key
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Identity proven by a verified token, stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub email: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            email: claims.email,
        }
    }
}

/// Second whitespace-separated item of the header value.
///
/// The scheme word itself is not checked.
fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.split_whitespace().nth(1)
}

/// Resolve the `Authorization` header into a verified identity
pub fn authenticate(
    auth_header: Option<&header::HeaderValue>,
    jwt_config: &JwtConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let auth_header = auth_header.ok_or(AuthError::MissingToken)?;
    let auth_header = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = extract_token(auth_header).ok_or(AuthError::InvalidToken)?;

    match verify_token(token, jwt_config) {
        Ok(claims) => Ok(AuthenticatedUser::from_claims(claims)),
        Err(e) => {
            debug!(error = %e, "Token verification failed");
            Err(AuthError::InvalidToken)
        }
    }
}

/// JWT authentication middleware, requires a valid bearer token
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let result = authenticate(
        request.headers().get(header::AUTHORIZATION),
        &auth_state.jwt_config,
    );

    match result {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(error) => auth_error_response(error),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => TOKEN_MISSING,
        AuthError::InvalidToken => TOKEN_INVALID,
    };
    ApiError::unauthorized(message).into_response()
}
