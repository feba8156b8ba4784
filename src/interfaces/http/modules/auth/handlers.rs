//! Authentication API handlers

use axum::{extract::State, Json};
use tracing::error;

use super::dto::{LoginRequest, LoginResponse};
use crate::domain::DomainError;
use crate::interfaces::http::common::messages::{INVALID_CREDENTIALS, LOGIN_FAILED};
use crate::interfaces::http::common::{ApiError, MessageResponse, ValidatedJson};
use crate::interfaces::http::modules::users::UserHandlerState;

#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed token", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Store error", body = MessageResponse)
    )
)]
pub async fn login(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    match state.user_service.login(&email, &password).await {
        Ok(result) => Ok(Json(LoginResponse {
            token: result.token,
        })),
        Err(DomainError::Unauthorized(_)) => Err(ApiError::unauthorized(INVALID_CREDENTIALS)),
        Err(e) => {
            error!(error = %e, "Login failed");
            Err(ApiError::internal(LOGIN_FAILED))
        }
    }
}
