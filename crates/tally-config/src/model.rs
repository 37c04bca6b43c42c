// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tally cost tracker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.
//!
//! Configuration is a convenience for applications embedding the tracker:
//! the core crates take explicit parameters and never read config
//! themselves.

use serde::{Deserialize, Serialize};

/// Top-level Tally configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TallyConfig {
    /// Tracker behavior settings.
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cost attribution settings.
    #[serde(default)]
    pub cost: CostConfig,
}

/// Tracker behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Database file path. `None` uses the platform data directory.
    #[serde(default)]
    pub path: Option<String>,
}

/// Cost attribution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Organization id applied to records when the caller supplies none.
    #[serde(default = "default_org_id")]
    pub org_id: String,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            org_id: default_org_id(),
        }
    }
}

fn default_org_id() -> String {
    "default".to_string()
}
