//! Configuration structs

mod app_config;
mod membership;

pub use app_config::{
    AccessConfig, AdminApiConfig, AppConfig, AppSettings, ConfigError, DatabaseBackend,
    DatabaseConfig, Environment, PlatformConfig, ServerConfig,
};
pub use membership::MembershipRules;
