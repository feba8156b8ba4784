//! API Router with OpenAPI document

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::application::UserService;
use crate::interfaces::http::common::MessageResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{auth, health, metrics, request_id, users};

/// Everything the handlers need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(user_service: Arc<UserService>) -> Self {
        Self {
            user_service,
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for users::UserHandlerState {
    fn from_ref(s: &AppState) -> Self {
        users::UserHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        AuthState {
            jwt_config: s.user_service.jwt_config().clone(),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            repo: Arc::clone(s.user_service.repository()),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::get_current_user,
        auth::login,
    ),
    components(
        schemas(
            MessageResponse,
            users::RegisterRequest,
            users::UserProfile,
            auth::LoginRequest,
            auth::LoginResponse,
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Usuarios", description = "Registration and self-lookup"),
        (name = "Authentication", description = "Password login issuing a JWT"),
    ),
    info(
        title = "Usuarios API",
        version = "0.1.0",
        description = "User registration, login and profile lookup"
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the API router with all routes.
///
/// `/metrics` is only mounted when a Prometheus handle is supplied.
pub fn create_api_router(state: AppState, prometheus: Option<PrometheusHandle>) -> Router {
    let auth_state = AuthState::from_ref(&state);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // GET needs a token, POST (registration) is public
    let mut router = Router::new()
        .route(
            "/usuarios",
            get(users::get_current_user)
                .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
                .post(users::register),
        )
        .route("/login", post(auth::login))
        .route("/health", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state);

    if let Some(handle) = prometheus {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(metrics::MetricsState { handle });
        router = router.merge(metrics_routes);
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};

    use crate::domain::{
        CreateUserDto, DomainError, DomainResult, User, UserRepositoryInterface,
    };
    use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
    use crate::infrastructure::storage::InMemoryUserRepository;
    use crate::interfaces::http::common::messages;

    fn jwt() -> JwtConfig {
        JwtConfig::new("router-secret", Some(1))
    }

    fn test_app() -> (Router, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = Arc::new(UserService::new(repo.clone(), jwt(), 4));
        (create_api_router(AppState::new(service), None), repo)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        use tower::Service;
        let mut svc = app.clone().into_service();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_auth(auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri("/usuarios");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn registration(email: &str, password: &str) -> Value {
        json!({"email": email, "password": password, "rol": "editor", "lenguage": "es"})
    }

    async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
        let (status, _) = send(app, post_json("/usuarios", registration(email, password))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            post_json("/login", json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token in body").to_string()
    }

    #[tokio::test]
    async fn register_login_and_lookup_round() {
        let (app, _) = test_app();

        let (status, body) = send(
            &app,
            post_json("/usuarios", registration("ana@example.com", "s3cret")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"message": messages::USER_REGISTERED}));

        let (status, body) = send(
            &app,
            post_json("/login", json!({"email": "ana@example.com", "password": "s3cret"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap();

        let (status, body) = send(&app, get_with_auth(Some(&format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{"email": "ana@example.com", "rol": "editor", "lenguage": "es"}])
        );
    }

    #[tokio::test]
    async fn registration_with_missing_or_empty_field_is_rejected() {
        let (app, repo) = test_app();

        let bodies = [
            json!({"password": "p", "rol": "r", "lenguage": "l"}),
            json!({"email": "a@b.c", "rol": "r", "lenguage": "l"}),
            json!({"email": "a@b.c", "password": "p", "lenguage": "l"}),
            json!({"email": "a@b.c", "password": "p", "rol": "r"}),
            json!({"email": "", "password": "p", "rol": "r", "lenguage": "l"}),
            json!({"email": "a@b.c", "password": "p", "rol": null, "lenguage": "l"}),
            json!({}),
        ];

        for body in bodies {
            let (status, response) = send(&app, post_json("/usuarios", body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(response, json!({"message": messages::FIELDS_REQUIRED}));
        }
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn unreadable_registration_body_is_400() {
        let (app, repo) = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/usuarios")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_get_identical_401() {
        let (app, _) = test_app();
        register_and_login(&app, "ana@example.com", "s3cret").await;

        let (status, wrong) = send(
            &app,
            post_json("/login", json!({"email": "ana@example.com", "password": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, unknown) = send(
            &app,
            post_json("/login", json!({"email": "bob@example.com", "password": "s3cret"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        assert_eq!(wrong, unknown);
        assert_eq!(wrong, json!({"message": messages::INVALID_CREDENTIALS}));
    }

    #[tokio::test]
    async fn login_with_absent_fields_is_401() {
        let (app, _) = test_app();
        register_and_login(&app, "ana@example.com", "s3cret").await;

        let (status, _) = send(&app, post_json("/login", json!({"email": "ana@example.com"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lookup_without_header_is_401() {
        let (app, _) = test_app();
        let (status, body) = send(&app, get_with_auth(None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": messages::TOKEN_MISSING}));
    }

    #[tokio::test]
    async fn lookup_with_malformed_token_is_401() {
        let (app, _) = test_app();

        for header_value in ["Bearer garbage", "Bearer", "Bearer a.b.c"] {
            let (status, body) = send(&app, get_with_auth(Some(header_value))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header_value}");
            assert_eq!(body, json!({"message": messages::TOKEN_INVALID}));
        }
    }

    #[tokio::test]
    async fn lookup_with_foreign_signature_is_401() {
        let (app, _) = test_app();
        register_and_login(&app, "ana@example.com", "s3cret").await;

        let forged = create_token("ana@example.com", &JwtConfig::new("other", None)).unwrap();
        let (status, _) = send(&app, get_with_auth(Some(&format!("Bearer {}", forged)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_for_removed_user_is_404() {
        let (app, repo) = test_app();
        let token = register_and_login(&app, "ana@example.com", "s3cret").await;
        repo.remove("ana@example.com");

        let (status, body) = send(&app, get_with_auth(Some(&format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": messages::USER_NOT_FOUND}));
    }

    #[tokio::test]
    async fn valid_token_for_never_registered_email_is_404() {
        let (app, _) = test_app();
        let token = create_token("ghost@example.com", &jwt()).unwrap();

        let (status, _) = send(&app, get_with_auth(Some(&format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicate_registration_fails_with_500_and_keeps_one_row() {
        let (app, repo) = test_app();
        register_and_login(&app, "ana@example.com", "first").await;

        let (status, body) = send(
            &app,
            post_json("/usuarios", registration("ana@example.com", "second")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": messages::REGISTER_FAILED}));
        assert_eq!(repo.len(), 1);

        // The first password still works.
        let (status, _) = send(
            &app,
            post_json("/login", json!({"email": "ana@example.com", "password": "first"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Repository whose every call fails like a dropped database connection.
    struct BrokenRepository;

    #[async_trait]
    impl UserRepositoryInterface for BrokenRepository {
        async fn create_user(&self, _dto: CreateUserDto) -> DomainResult<()> {
            Err(DomainError::Storage("connection refused (db:5432)".into()))
        }

        async fn get_user_by_email(&self, _email: &str) -> DomainResult<Option<User>> {
            Err(DomainError::Storage("connection refused (db:5432)".into()))
        }

        async fn ping(&self) -> DomainResult<()> {
            Err(DomainError::Storage("connection refused (db:5432)".into()))
        }
    }

    fn broken_app() -> Router {
        let service = Arc::new(UserService::new(Arc::new(BrokenRepository), jwt(), 4));
        create_api_router(AppState::new(service), None)
    }

    #[tokio::test]
    async fn store_failures_are_500_without_details() {
        let app = broken_app();

        let (status, body) = send(
            &app,
            post_json("/usuarios", registration("ana@example.com", "s3cret")),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": messages::REGISTER_FAILED}));

        let (status, body) = send(
            &app,
            post_json("/login", json!({"email": "ana@example.com", "password": "s3cret"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": messages::LOGIN_FAILED}));

        let token = create_token("ana@example.com", &jwt()).unwrap();
        let (status, body) = send(&app, get_with_auth(Some(&format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": messages::LOOKUP_FAILED}));
    }

    #[tokio::test]
    async fn health_reports_store_state() {
        let (app, _) = test_app();
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"]["status"], "ok");

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&broken_app(), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "degraded");
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let (app, _) = test_app();
        let req = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/usuarios"]["post"].is_object());
        assert!(body["paths"]["/usuarios"]["get"].is_object());
        assert!(body["paths"]["/login"]["post"].is_object());
    }

    #[tokio::test]
    async fn responses_carry_request_id_and_cors_headers() {
        use tower::Service;
        let (app, _) = test_app();
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://frontend.example")
            .header(request_id::REQUEST_ID_HEADER, "req-123")
            .body(Body::empty())
            .unwrap();

        let resp = app.into_service().call(req).await.unwrap();
        assert_eq!(
            resp.headers().get(request_id::REQUEST_ID_HEADER).unwrap(),
            "req-123"
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn expired_token_is_rejected_on_lookup() {
        let repo = Arc::new(InMemoryUserRepository::new());
        let expired = JwtConfig::new("router-secret", Some(-2));
        let service = Arc::new(UserService::new(repo, expired, 4));
        let app = create_api_router(AppState::new(service), None);

        let token = register_and_login(&app, "ana@example.com", "s3cret").await;

        let (status, body) = send(&app, get_with_auth(Some(&format!("Bearer {}", token)))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"message": messages::TOKEN_INVALID}));
    }

    #[tokio::test]
    async fn metrics_are_recorded_under_the_matched_route() {
        use tower::Service;

        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        // Current-thread runtime: the thread-local recorder sees every request.
        let _guard = ::metrics::set_default_local_recorder(&recorder);

        let repo = Arc::new(InMemoryUserRepository::new());
        let service = Arc::new(UserService::new(repo, jwt(), 4));
        let app = create_api_router(AppState::new(service), Some(handle));

        let (status, _) = send(
            &app,
            post_json("/usuarios", registration("ana@example.com", "s3cret")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let resp = app.clone().into_service().call(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();

        let line = text
            .lines()
            .find(|l| {
                l.starts_with("http_requests_total{")
                    && l.contains(r#"path="/usuarios""#)
                    && l.contains(r#"method="POST""#)
            })
            .unwrap_or_else(|| panic!("no counter for /usuarios in:\n{text}"));
        assert!(line.contains(r#"status="201""#), "{line}");
        assert!(line.ends_with(" 1"), "{line}");
    }

    #[tokio::test]
    async fn metrics_route_is_absent_without_a_handle() {
        let (app, _) = test_app();
        let req = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
