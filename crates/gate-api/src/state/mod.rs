//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! configuration and the database handle used by readiness checks.

use std::sync::Arc;

use gate_common::AppConfig;
use gate_db::Database;
use gate_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Service context containing all dependencies
    service_context: Arc<ServiceContext>,
    /// Application configuration
    config: Arc<AppConfig>,
    database: Database,
}

impl AppState {
    pub fn new(service_context: ServiceContext, config: AppConfig, database: Database) -> Self {
        Self {
            service_context: Arc::new(service_context),
            config: Arc::new(config),
            database,
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Shared secret expected in `Authorization: Bearer`
    pub fn api_token(&self) -> &str {
        &self.config.admin_api.token
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .field("database", &self.database.backend_name())
            .finish()
    }
}
