//! Server runtime for the user-account service.
//!
//! [`ServerHandle`] owns the full lifecycle: database pool, HTTP listener
//! and graceful shutdown. The binary only parses arguments, loads the
//! configuration and calls into this module.

use std::net::SocketAddr;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::UserService;
use crate::config::AppConfig;
use crate::domain::UserRepositoryInterface;
use crate::infrastructure::{init_database, SeaOrmUserRepository};
use crate::interfaces::http::{create_api_router, AppState};
use crate::support::shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Build the shared service context from a repository and the settings.
pub fn build_state(config: &AppConfig, repo: Arc<dyn UserRepositoryInterface>) -> AppState {
    let user_service = UserService::new(
        repo,
        config.security.jwt_config(),
        config.security.bcrypt_cost,
    );
    AppState::new(Arc::new(user_service))
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running server.
pub struct ServerHandle {
    /// Address the listener is bound to.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Connect to the database, bind the listener and start serving.
    ///
    /// `/metrics` is exposed only when a Prometheus handle is given.
    pub async fn start(
        config: &AppConfig,
        prometheus: Option<PrometheusHandle>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Starting usuarios service...");

        // ── Database ───────────────────────────────────────────
        let db_config = config.database.to_database_config();
        info!("Database: {}", db_config.redacted_url());
        let db = init_database(&db_config).await?;

        match config.security.jwt_config().expiration_hours {
            Some(hours) => info!("JWT configured with {}h token expiration", hours),
            None => info!("JWT tokens are issued without expiration"),
        }

        // ── Services ───────────────────────────────────────────
        let repo: Arc<dyn UserRepositoryInterface> =
            Arc::new(SeaOrmUserRepository::new(db.clone()));
        let state = build_state(config, repo);
        let router = create_api_router(state, prometheus);

        // ── HTTP listener ──────────────────────────────────────
        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        let addr = config.server.address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!(
            "OpenAPI document available at http://{}/api-docs/openapi.json",
            local_addr
        );

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        // A crashed server must still release whoever waits on the signal.
        let failure_signal = shutdown_signal.clone();
        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
                failure_signal.trigger();
            }
        });

        Ok(Self {
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the shutdown signal, drain in-flight requests and close the
    /// pool.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            ..
        } = self;

        shutdown
            .shutdown_with_cleanup(|| async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                } else {
                    info!("REST API server stopped");
                }
            })
            .await;

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Usuarios service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down usuarios service...");
        self.trigger_shutdown();
        self.wait().await;
    }
}

// ── Tracing ────────────────────────────────────────────────────────

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
