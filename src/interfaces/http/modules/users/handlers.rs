//! User API handlers
//!
//! Delegates to `UserService` from the application/identity layer.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::error;

use super::dto::{RegisterRequest, UserProfile};
use crate::application::UserService;
use crate::domain::DomainError;
use crate::interfaces::http::common::messages::{
    FIELDS_REQUIRED, LOOKUP_FAILED, REGISTER_FAILED, TOKEN_MISSING, USER_NOT_FOUND,
    USER_REGISTERED,
};
use crate::interfaces::http::common::{ApiError, MessageResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    post,
    path = "/usuarios",
    tag = "Usuarios",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 400, description = "A required field is missing", body = MessageResponse),
        (status = 500, description = "Store error, duplicate email included", body = MessageResponse)
    )
)]
pub async fn register(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    match state.user_service.register(request.into_command()).await {
        Ok(()) => Ok((
            StatusCode::CREATED,
            Json(MessageResponse::new(USER_REGISTERED)),
        )),
        Err(DomainError::Validation(_)) => Err(ApiError::bad_request(FIELDS_REQUIRED)),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            Err(ApiError::internal(REGISTER_FAILED))
        }
    }
}

#[utoipa::path(
    get,
    path = "/usuarios",
    tag = "Usuarios",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The authenticated user", body = [UserProfile]),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 404, description = "Token valid but user gone", body = MessageResponse),
        (status = 500, description = "Store error", body = MessageResponse)
    )
)]
pub async fn get_current_user(
    State(state): State<UserHandlerState>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    let Some(Extension(user)) = user else {
        return Err(ApiError::unauthorized(TOKEN_MISSING));
    };

    match state.user_service.profile(&user.email).await {
        Ok(found) => Ok(Json(vec![UserProfile::from(found)])),
        Err(DomainError::NotFound { .. }) => Err(ApiError::not_found(USER_NOT_FOUND)),
        Err(e) => {
            error!(error = %e, "Failed to load user profile");
            Err(ApiError::internal(LOOKUP_FAILED))
        }
    }
}
