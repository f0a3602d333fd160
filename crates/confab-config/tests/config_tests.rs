// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading, merging, and diagnostics.

use confab_config::{load_and_validate_str, load_config_from_str, ConfigError};
use serial_test::serial;

#[test]
fn defaults_load_without_any_file() {
    let config = load_config_from_str("").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8787);
    assert_eq!(config.storage.database_path, "confab.db");
    assert_eq!(config.delivery.timeout_secs, 10);
    assert!(config.worker.enabled);
    assert_eq!(config.worker.poll_interval_secs, 5);
    assert_eq!(config.log.level, "info");
}

#[test]
fn toml_overrides_defaults() {
    let config = load_config_from_str(
        r#"
        [server]
        port = 9090
        bearer_token = "hunter2"

        [delivery]
        endpoint = "https://provider.example.com/v1/send"
        timeout_secs = 3

        [worker]
        enabled = false
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.bearer_token.as_deref(), Some("hunter2"));
    assert_eq!(
        config.delivery.endpoint,
        "https://provider.example.com/v1/send"
    );
    assert_eq!(config.delivery.timeout_secs, 3);
    assert!(!config.worker.enabled);
    // Untouched sections keep their defaults.
    assert_eq!(config.storage.database_path, "confab.db");
}

#[test]
fn unknown_key_yields_a_suggestion() {
    let errors = load_and_validate_str(
        r#"
        [delivery]
        endpont = "https://provider.example.com/send"
        "#,
    )
    .unwrap_err();

    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey { key, suggestion, .. } => {
                Some((key.clone(), suggestion.clone()))
            }
            _ => None,
        })
        .expect("expected an UnknownKey diagnostic");
    assert!(unknown.0.contains("endpont"));
    assert_eq!(unknown.1.as_deref(), Some("endpoint"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str(
        r#"
        [server]
        port = "not a number"
        "#,
    )
    .unwrap_err();
    assert!(!errors.is_empty());
}

#[test]
fn validation_rejects_bad_endpoint() {
    let errors = load_and_validate_str(
        r#"
        [delivery]
        endpoint = "ftp://example.com"
        "#,
    )
    .unwrap_err();
    assert!(errors
        .iter()
        .any(|e| e.to_string().contains("delivery.endpoint")));
}

#[test]
#[serial]
fn env_var_overrides_section_keys() {
    // SAFETY: serialized test; no other thread reads the environment here.
    unsafe {
        std::env::set_var("CONFAB_DELIVERY_TIMEOUT_SECS", "30");
        std::env::set_var("CONFAB_SERVER_BEARER_TOKEN", "env-token");
    }

    let config = confab_config::load_config().unwrap();
    assert_eq!(config.delivery.timeout_secs, 30);
    assert_eq!(config.server.bearer_token.as_deref(), Some("env-token"));

    unsafe {
        std::env::remove_var("CONFAB_DELIVERY_TIMEOUT_SECS");
        std::env::remove_var("CONFAB_SERVER_BEARER_TOKEN");
    }
}
