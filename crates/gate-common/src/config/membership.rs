//! Membership rules
//!
//! Loaded with the `config` crate from an optional file (`MEMBERSHIP_CONFIG`,
//! default `config/membership`, any format `config` understands) with
//! `MEMBERSHIP__*` environment variables layered on top.

use gate_core::{DomainError, GrantDuration, MembershipIdPolicy};
use serde::Deserialize;
use std::env;

use super::ConfigError;

const DEFAULT_RULES_PATH: &str = "config/membership";

/// Timing and validation rules for grants
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MembershipRules {
    /// Lead time before expiry at which the renewal warning is sent
    pub warn_before_secs: u64,
    /// Window after expiry before access is revoked
    pub grace_secs: u64,
    /// Scheduler tick interval
    pub poll_interval_secs: u64,
    /// Full-match pattern for submitted membership ids
    pub id_pattern: String,
    /// Durations offered to administrators; `0` means unlimited
    pub approve_durations: Vec<i64>,
    /// Idle time after which a principal's session is reset
    pub session_timeout_secs: u64,
    /// Deliver `session_timeout` when a session is reset
    pub session_timeout_notify: bool,
}

impl Default for MembershipRules {
    fn default() -> Self {
        Self {
            warn_before_secs: 86_400,
            grace_secs: 86_400,
            poll_interval_secs: 30,
            id_pattern: ".+".to_string(),
            approve_durations: vec![2_592_000, 0],
            session_timeout_secs: 900,
            session_timeout_notify: false,
        }
    }
}

impl MembershipRules {
    /// Load from the file named by `MEMBERSHIP_CONFIG` plus env overrides
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("MEMBERSHIP_CONFIG").unwrap_or_else(|_| DEFAULT_RULES_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from `path` (missing file allowed) plus env overrides
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let rules: Self = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("MEMBERSHIP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("approve_durations"),
            )
            .build()?
            .try_deserialize()?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "poll_interval_secs",
                "must be positive".to_string(),
            ));
        }
        if self.session_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "session_timeout_secs",
                "must be positive".to_string(),
            ));
        }
        self.grant_durations()
            .map_err(|e| ConfigError::InvalidValue("approve_durations", e.to_string()))?;
        self.id_policy()
            .map_err(|e| ConfigError::InvalidValue("id_pattern", e.to_string()))?;
        Ok(())
    }

    pub fn grant_durations(&self) -> Result<Vec<GrantDuration>, DomainError> {
        self.approve_durations
            .iter()
            .map(|secs| GrantDuration::from_secs(*secs))
            .collect()
    }

    pub fn id_policy(&self) -> Result<MembershipIdPolicy, DomainError> {
        MembershipIdPolicy::new(&self.id_pattern)
    }

    pub fn warn_before(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.warn_before_secs as i64)
    }

    pub fn grace(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.grace_secs as i64)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn session_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let rules = MembershipRules::default();
        assert_eq!(rules.warn_before_secs, 86_400);
        assert_eq!(rules.poll_interval_secs, 30);
        assert!(rules.validate().is_ok());
        assert_eq!(
            rules.grant_durations().unwrap(),
            vec![GrantDuration::Seconds(2_592_000), GrantDuration::Unlimited]
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let rules = MembershipRules::load_from("does/not/exist/membership").unwrap();
        assert_eq!(rules.grace_secs, MembershipRules::default().grace_secs);
    }

    #[test]
    fn test_rejects_negative_duration() {
        let rules = MembershipRules {
            approve_durations: vec![60, -1],
            ..MembershipRules::default()
        };
        assert!(matches!(
            rules.validate(),
            Err(ConfigError::InvalidValue("approve_durations", _))
        ));
    }

    #[test]
    fn test_rejects_bad_pattern() {
        let rules = MembershipRules {
            id_pattern: "[".to_string(),
            ..MembershipRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_zero_poll_interval() {
        let rules = MembershipRules {
            poll_interval_secs: 0,
            ..MembershipRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
