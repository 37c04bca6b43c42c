// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tally.toml` > `~/.config/tally/tally.toml` >
//! `/etc/tally/tally.toml` with environment variable overrides via the
//! `TALLY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TallyConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tally/tally.toml` (system-wide)
/// 3. `~/.config/tally/tally.toml` (user XDG config)
/// 4. `./tally.toml` (local directory)
/// 5. `TALLY_*` environment variables
pub fn load_config() -> Result<TallyConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TallyConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for
/// diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TallyConfig::default()))
        .merge(Toml::file("/etc/tally/tally.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tally/tally.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tally.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TALLY_TRACKER_LOG_LEVEL` must map to
/// `tracker.log_level`, not `tracker.log.level`.
fn env_provider() -> Env {
    Env::prefixed("TALLY_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: TALLY_TRACKER_LOG_LEVEL -> "tracker_log_level"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("tracker_", "tracker.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("cost_", "cost.", 1);
        mapped.into()
    })
}
