// SPDX-FileCopyrightText: 2026 Confab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment-to-miette error bridge with fuzzy match suggestions.
//!
//! Converts Figment deserialization errors into miette diagnostics with
//! valid key listings and "did you mean?" suggestions using Jaro-Winkler
//! string similarity.

use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// 0.75 catches common typos like `databse_path` -> `database_path`
/// while filtering noise.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with diagnostic context.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// An unknown key was found in the configuration.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(confab::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// The unrecognized key name.
        key: String,
        /// Suggested correction via fuzzy matching, if any.
        suggestion: Option<String>,
        /// List of valid keys for the section.
        valid_keys: String,
    },

    /// A configuration value has the wrong type.
    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(confab::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        /// The key with the wrong type.
        key: String,
        /// Description of the type mismatch.
        detail: String,
        /// What type was expected.
        expected: String,
    },

    /// A required configuration key is missing.
    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(confab::config::missing_key),
        help("add `{key} = <value>` to your confab.toml")
    )]
    MissingKey {
        /// The missing key name.
        key: String,
    },

    /// A validation error for a config value.
    #[error("validation error: {message}")]
    #[diagnostic(code(confab::config::validation))]
    Validation {
        /// Description of the validation failure.
        message: String,
    },

    /// Catch-all for other configuration errors.
    #[error("configuration error: {0}")]
    #[diagnostic(code(confab::config::other))]
    Other(String),
}

/// Format the help message for unknown key errors.
fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` into a list of `ConfigError` diagnostics.
///
/// A figment error may contain multiple underlying errors; each is converted
/// to the matching `ConfigError` variant, with fuzzy match suggestions for
/// unknown field errors.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter().map(single_error).collect()
}

fn single_error(e: figment::Error) -> ConfigError {
    use figment::error::Kind;

    match &e.kind {
        Kind::UnknownField(field, expected) => {
            let key = if e.path.is_empty() {
                field.clone()
            } else {
                format!("{}.{}", e.path.join("."), field)
            };
            ConfigError::UnknownKey {
                key,
                suggestion: suggest(field, expected),
                valid_keys: expected.join(", "),
            }
        }
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: e.path.join("."),
            detail: format!("found {actual}"),
            expected: expected.clone(),
        },
        Kind::MissingField(name) => ConfigError::MissingKey {
            key: name.to_string(),
        },
        _ => ConfigError::Other(e.to_string()),
    }
}

/// Pick the closest valid key by Jaro-Winkler similarity, if close enough.
fn suggest(unknown: &str, valid: &[&str]) -> Option<String> {
    valid
        .iter()
        .map(|candidate| (*candidate, strsim::jaro_winkler(unknown, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.to_string())
}

/// Print configuration errors to stderr, one diagnostic per line with its
/// help text when available.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!("error: {err}");
        if let Some(help) = err.help() {
            eprintln!("  help: {help}");
        }
    }
}
