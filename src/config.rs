//! # Configuration
//!
//! [`OrchestratorConfig`] is read from a TOML file, from the environment, or both
//! (file first, environment on top). Missing keys keep their defaults.
//!
//! ```toml
//! downstream_timeout_ms = 3000
//! request_timeout_ms = 10000
//! item_validation = "concurrent"
//!
//! [user_service]
//! failure_ratio = 0.5
//! min_requests = 10
//!
//! [product_service]
//! enabled = false
//! ```
//!
//! The `CB_*` variables apply to both dependencies. An unparseable variable is
//! logged and ignored.

use crate::orchestrator::ItemValidation;
use resilience::BreakerSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

/// Breaker parameters as written in configuration. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
    pub failure_ratio: f64,
    pub min_requests: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        let defaults = BreakerSettings::default();
        Self {
            enabled: defaults.enabled,
            max_requests: defaults.max_requests,
            interval_seconds: defaults.interval.as_secs(),
            timeout_seconds: defaults.timeout.as_secs(),
            failure_ratio: defaults.failure_ratio,
            min_requests: defaults.min_requests,
        }
    }
}

impl BreakerConfig {
    pub fn settings(&self) -> BreakerSettings {
        BreakerSettings {
            enabled: self.enabled,
            max_requests: self.max_requests,
            interval: Duration::from_secs(self.interval_seconds),
            timeout: Duration::from_secs(self.timeout_seconds),
            failure_ratio: self.failure_ratio,
            min_requests: self.min_requests,
        }
    }

    fn apply_env(&mut self, lookup: &dyn Fn(&str) -> Option<String>) {
        override_with(lookup, "CB_ENABLED", &mut self.enabled, parse_bool);
        override_with(lookup, "CB_MAX_REQUESTS", &mut self.max_requests, parse);
        override_with(lookup, "CB_INTERVAL_SECONDS", &mut self.interval_seconds, parse);
        override_with(lookup, "CB_TIMEOUT_SECONDS", &mut self.timeout_seconds, parse);
        override_with(lookup, "CB_FAILURE_RATIO", &mut self.failure_ratio, parse);
        override_with(lookup, "CB_MIN_REQUESTS", &mut self.min_requests, parse);
    }

    fn validate(&self, name: &str, errors: &mut Vec<String>) {
        if !(0.0..=1.0).contains(&self.failure_ratio) {
            errors.push(format!(
                "{name}.failure_ratio must be between 0 and 1, got {}",
                self.failure_ratio
            ));
        }
        if self.enabled && self.timeout_seconds == 0 {
            errors.push(format!("{name}.timeout_seconds must be positive"));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Per-call timeout for the user and product services.
    pub downstream_timeout_ms: u64,
    /// Deadline for a whole orchestrator operation.
    pub request_timeout_ms: u64,
    pub item_validation: ItemValidation,
    pub user_service: BreakerConfig,
    pub product_service: BreakerConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            downstream_timeout_ms: 3_000,
            request_timeout_ms: 10_000,
            item_validation: ItemValidation::default(),
            user_service: BreakerConfig::default(),
            product_service: BreakerConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Loads and validates a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok());
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_with(&lookup, "DOWNSTREAM_TIMEOUT_MS", &mut self.downstream_timeout_ms, parse);
        override_with(&lookup, "REQUEST_TIMEOUT_MS", &mut self.request_timeout_ms, parse);
        override_with(&lookup, "ITEM_VALIDATION", &mut self.item_validation, parse);
        self.user_service.apply_env(&lookup);
        self.product_service.apply_env(&lookup);
    }

    /// Every violation, not just the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.downstream_timeout_ms == 0 {
            errors.push("downstream_timeout_ms must be positive".to_string());
        }
        if self.downstream_timeout_ms >= self.request_timeout_ms {
            errors.push(format!(
                "downstream_timeout_ms ({}) must be shorter than request_timeout_ms ({})",
                self.downstream_timeout_ms, self.request_timeout_ms
            ));
        }
        self.user_service.validate("user_service", &mut errors);
        self.product_service.validate("product_service", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn downstream_timeout(&self) -> Duration {
        Duration::from_millis(self.downstream_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn override_with<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
    parser: fn(&str) -> Option<T>,
) {
    let Some(raw) = lookup(name) else {
        return;
    };
    match parser(&raw) {
        Some(value) => *target = value,
        None => warn!(variable = name, value = %raw, "Ignoring unparseable environment variable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_the_service_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.downstream_timeout(), Duration::from_secs(3));
        assert_eq!(config.user_service.settings(), BreakerSettings::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_overrides_both_breakers() {
        let mut config = OrchestratorConfig::default();
        config.apply_env(env(&[
            ("CB_FAILURE_RATIO", "0.25"),
            ("CB_MIN_REQUESTS", "4"),
            ("CB_ENABLED", "FALSE"),
            ("ITEM_VALIDATION", "concurrent"),
            ("DOWNSTREAM_TIMEOUT_MS", "500"),
        ]));

        assert_eq!(config.user_service.failure_ratio, 0.25);
        assert_eq!(config.product_service.min_requests, 4);
        assert!(!config.product_service.settings().enabled);
        assert_eq!(config.item_validation, ItemValidation::Concurrent);
        assert_eq!(config.downstream_timeout_ms, 500);
    }

    #[test]
    fn unparseable_values_keep_the_default() {
        let mut config = OrchestratorConfig::default();
        config.apply_env(env(&[("CB_MAX_REQUESTS", "five"), ("CB_ENABLED", "maybe")]));
        assert_eq!(config, OrchestratorConfig::default());
    }

    #[test]
    fn validation_reports_every_violation() {
        let mut config = OrchestratorConfig::default();
        config.user_service.failure_ratio = 1.5;
        config.product_service.failure_ratio = -0.1;
        config.downstream_timeout_ms = 20_000;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("request_timeout_ms"));
    }

    #[test]
    fn toml_sections_are_partial() {
        let config: OrchestratorConfig = toml::from_str(
            r#"
            item_validation = "concurrent"

            [product_service]
            enabled = false
            timeout_seconds = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.item_validation, ItemValidation::Concurrent);
        assert!(!config.product_service.enabled);
        assert_eq!(config.product_service.timeout_seconds, 5);
        assert_eq!(config.product_service.min_requests, 20);
        assert_eq!(config.user_service, BreakerConfig::default());
    }

    #[test]
    fn load_reports_missing_files() {
        let err = OrchestratorConfig::load(Path::new("/nonexistent/orchestrator.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
