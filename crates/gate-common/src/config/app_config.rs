//! Application configuration structs
//!
//! Loads process settings from environment variables (and `.env`).

use gate_core::{EndpointId, PrincipalId};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

use super::MembershipRules;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub access: AccessConfig,
    pub admin_api: AdminApiConfig,
    pub platform: PlatformConfig,
    pub membership: MembershipRules,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    /// `json` or `pretty`; unset follows the environment
    #[serde(default)]
    pub log_format: Option<String>,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Storage engine behind the membership store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    /// Embedded file-backed store
    #[default]
    Sqlite,
    Postgres,
}

impl FromStr for DatabaseBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(ConfigError::InvalidValue("DB_BACKEND", other.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Access endpoints and administrative roles
#[derive(Debug, Clone, Default)]
pub struct AccessConfig {
    pub endpoints: Vec<EndpointId>,
    /// Always treated as a top-level admin
    pub root_admin: Option<PrincipalId>,
    /// Prefix for generated join-link labels (followed by the endpoint id)
    pub join_link_label_prefix: Option<String>,
}

/// Admin HTTP surface credentials
#[derive(Debug, Clone)]
pub struct AdminApiConfig {
    pub token: String,
}

/// Chat-platform adapters
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub api_base: String,
    pub bot_token: String,
    pub notify_webhook_url: String,
}

// Default value functions
fn default_app_name() -> String {
    "gatekeeper".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://gatekeeper.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_platform_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let membership = MembershipRules::load()?;
        Self::from_lookup(|key| env::var(key).ok(), membership)
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F, membership: MembershipRules) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|v| {
                    v.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key, v.clone()))
                })
                .transpose()
        };

        let env_kind = match lookup("APP_ENV").map(|s| s.to_lowercase()).as_deref() {
            Some("production") => Environment::Production,
            Some("staging") => Environment::Staging,
            Some("development") | None => Environment::Development,
            Some(other) => return Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        };

        let backend = lookup("DB_BACKEND")
            .map(|s| s.parse::<DatabaseBackend>())
            .transpose()?
            .unwrap_or_default();

        let database_url = match backend {
            DatabaseBackend::Sqlite => {
                lookup("DATABASE_URL").unwrap_or_else(default_database_url)
            }
            DatabaseBackend::Postgres => required("DATABASE_URL")?,
        };

        let endpoints = lookup("ACCESS_ENDPOINTS")
            .map(|raw| {
                EndpointId::parse_list(&raw)
                    .map_err(|_| ConfigError::InvalidValue("ACCESS_ENDPOINTS", raw.clone()))
            })
            .transpose()?
            .unwrap_or_default();

        let root_admin = lookup("ROOT_ADMIN_ID")
            .filter(|v| !v.trim().is_empty())
            .map(|raw| {
                PrincipalId::parse(&raw).map_err(|_| ConfigError::InvalidValue("ROOT_ADMIN_ID", raw))
            })
            .transpose()?;

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: env_kind,
                log_format: lookup("LOG_FORMAT"),
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port: parsed("API_PORT")?
                    .map(|p| {
                        u16::try_from(p)
                            .map_err(|_| ConfigError::InvalidValue("API_PORT", p.to_string()))
                    })
                    .transpose()?
                    .unwrap_or_else(default_port),
            },
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections: parsed("DATABASE_MAX_CONNECTIONS")?
                    .map_or_else(default_max_connections, |v| v as u32),
                min_connections: parsed("DATABASE_MIN_CONNECTIONS")?
                    .map_or_else(default_min_connections, |v| v as u32),
            },
            access: AccessConfig {
                endpoints,
                root_admin,
                join_link_label_prefix: lookup("JOIN_LINK_LABEL_PREFIX")
                    .filter(|v| !v.is_empty()),
            },
            admin_api: AdminApiConfig {
                token: required("ADMIN_API_TOKEN")?,
            },
            platform: PlatformConfig {
                api_base: lookup("PLATFORM_API_BASE").unwrap_or_else(default_platform_api_base),
                bot_token: required("PLATFORM_BOT_TOKEN")?,
                notify_webhook_url: required("NOTIFY_WEBHOOK_URL")?,
            },
            membership,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Failed to load membership rules: {0}")]
    Load(#[from] config::ConfigError),
}
