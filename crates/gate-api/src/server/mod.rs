//! Server setup and initialization
//!
//! Builds the application, wires the platform adapters, starts the
//! background loops and serves HTTP until a shutdown signal arrives.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use gate_common::{AppConfig, AppError};
use gate_core::{EndpointClient, Notifier};
use gate_db::{Database, Repositories};
use gate_platform::{BotApiClient, HttpClientConfig, WebhookNotifier};
use gate_service::{ExpiryScheduler, ServiceContext, ServiceContextBuilder, SessionSweeper};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Connect to the configured store and make sure the schema exists
async fn open_database(config: &AppConfig) -> Result<Database, AppError> {
    info!(backend = ?config.database.backend, "Opening membership store...");
    let db = Database::connect(&gate_db::DatabaseConfig::from(&config.database)).await?;
    db.apply_schema().await?;
    info!("Membership store ready");
    Ok(db)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: AppConfig) -> Result<AppState, AppError> {
    let http = HttpClientConfig::default()
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    let endpoint_client: Arc<dyn EndpointClient> =
        Arc::new(BotApiClient::from_config(http.clone(), &config.platform));
    let notifier: Arc<dyn Notifier> =
        Arc::new(WebhookNotifier::from_config(http, &config.platform));

    create_app_state_with(config, endpoint_client, notifier).await
}

/// Create AppState with caller-supplied platform adapters
pub async fn create_app_state_with(
    config: AppConfig,
    endpoint_client: Arc<dyn EndpointClient>,
    notifier: Arc<dyn Notifier>,
) -> Result<AppState, AppError> {
    let db = open_database(&config).await?;

    let service_context = ServiceContextBuilder::new()
        .repositories(Repositories::new(&db))
        .endpoint_client(endpoint_client)
        .notifier(notifier)
        .rules(config.membership.clone())
        .access(config.access.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    info!(
        endpoints = service_context.endpoints().len(),
        root_admin = ?service_context.root_admin(),
        "Service context built"
    );

    Ok(AppState::new(service_context, config, db))
}

/// Start the expiry scheduler and the session sweeper
pub fn spawn_background(ctx: &ServiceContext, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(ExpiryScheduler::new(ctx.clone()).run(shutdown.clone())),
        tokio::spawn(SessionSweeper::new(ctx.clone()).run(shutdown)),
    ]
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run_server<F>(app: Router, address: &str, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {address}: {e}")))?;

    info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}

/// Wait for Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating shutdown"),
        () = terminate => info!("Received SIGTERM, initiating shutdown"),
    }
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let address = config.api.address();

    let state = create_app_state(config).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loops = spawn_background(state.service_context(), shutdown_rx);

    let app = create_app(state);
    let served = run_server(app, &address, shutdown_signal()).await;

    // Stop the loops whether or not the server exited cleanly
    let _ = shutdown_tx.send(true);
    for handle in loops {
        if let Err(e) = handle.await {
            error!(error = %e, "Background task panicked");
        }
    }
    info!("Shutdown complete");

    served
}
