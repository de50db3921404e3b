//! Gatekeeper entry point
//!
//! Run with:
//! ```bash
//! cargo run -p gate-api
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`), the
//! membership rules from `config/membership.toml` when present.

use gate_common::{try_init_tracing, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            if let Err(init) = try_init_tracing() {
                eprintln!("Warning: Failed to initialize tracing: {init}");
            }
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let tracing_config =
        TracingConfig::for_environment(config.app.env, config.app.log_format.as_deref());
    if let Err(e) = try_init_tracing_with_config(tracing_config) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.api.port,
        endpoints = config.access.endpoints.len(),
        "Configuration loaded"
    );

    if let Err(e) = gate_api::run(config).await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
