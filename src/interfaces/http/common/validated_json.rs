//! Validated JSON extractor for Axum
//!
//! `ValidatedJson<T>` works like `axum::Json<T>`, but additionally runs
//! `validator::Validate::validate()` on the deserialized value.
//! Both an unreadable body and a failed validation are answered with
//! `400 {"message": ...}`; the message is the one attached to the failing
//! rule, so one rule message shared by several fields is reported once.

use std::collections::BTreeSet;

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use super::messages::INVALID_JSON;
use super::ApiError;

/// An extractor that deserializes JSON and validates it.
///
/// # Usage
///
/// ```ignore
/// use validator::Validate;
///
/// #[derive(Deserialize, Validate)]
/// struct Signup {
///     #[validate(required(message = "email is required"))]
///     email: Option<String>,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<Signup>) {
///     // `body` is guaranteed to pass validation
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

/// Error type for `ValidatedJson` extraction failures.
pub enum ValidatedJsonRejection {
    /// JSON parsing failed.
    JsonError(JsonRejection),
    /// Validation failed.
    ValidationError(validator::ValidationErrors),
}

impl ValidatedJsonRejection {
    fn message(&self) -> String {
        match self {
            Self::JsonError(_) => INVALID_JSON.to_string(),
            Self::ValidationError(errors) => {
                let messages: BTreeSet<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("{}: {}", field, e.code))
                        })
                    })
                    .collect();

                if messages.is_empty() {
                    "Validation failed".to_string()
                } else {
                    messages.into_iter().collect::<Vec<_>>().join("; ")
                }
            }
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        if let Self::JsonError(rejection) = &self {
            debug!(error = %rejection, "Rejected request body");
        }
        ApiError::bad_request(self.message()).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(
        req: axum::extract::Request,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────
