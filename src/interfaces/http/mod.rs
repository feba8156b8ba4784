//! HTTP REST API interfaces
//!
//! - `common`: shared error body, messages and the validating JSON extractor
//! - `middleware`: bearer token authentication
//! - `modules`: handlers grouped per resource
//! - `router`: API router with OpenAPI documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, ApiDoc, AppState};
