//! Shared HTTP plumbing: error responses, fixed messages and the
//! validating JSON extractor.

pub mod error;
pub mod messages;
pub mod validated_json;

pub use error::{ApiError, MessageResponse};
pub use validated_json::ValidatedJson;
