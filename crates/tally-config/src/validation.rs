// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as known log levels and non-empty identifiers.

use crate::diagnostic::ConfigError;
use crate::model::TallyConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TallyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.tracker.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "tracker.log_level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.tracker.log_level
            ),
        });
    }

    if config.cost.org_id.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cost.org_id must not be empty".to_string(),
        });
    }

    if let Some(path) = &config.storage.path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "storage.path must not be empty when set".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
