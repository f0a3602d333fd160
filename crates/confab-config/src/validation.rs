// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses, URL-shaped endpoints, and
//! positive intervals.

use crate::diagnostic::ConfigError;
use crate::model::ConfabConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ConfabConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let endpoint = config.delivery.endpoint.trim();
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!(
                "delivery.endpoint must be an http(s) URL, got `{endpoint}`"
            ),
        });
    }

    if config.delivery.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "delivery.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.worker.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "worker.poll_interval_secs must be at least 1".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.log.level
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&ConfabConfig::default()).is_ok());
    }

    #[test]
    fn empty_host_is_rejected() {
        let mut config = ConfabConfig::default();
        config.server.host = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("server.host")));
    }

    #[test]
    fn non_url_endpoint_is_rejected() {
        let mut config = ConfabConfig::default();
        config.delivery.endpoint = "not-a-url".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("delivery.endpoint")));
    }

    #[test]
    fn zero_intervals_are_rejected_together() {
        let mut config = ConfabConfig::default();
        config.delivery.timeout_secs = 0;
        config.worker.poll_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        // Both problems are collected; validation does not fail fast.
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut config = ConfabConfig::default();
        config.log.level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("log.level")));
    }
}
