// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attribution field sources: literal values or log-time resolvers.
//!
//! `user_id`, `feature`, and `metadata` may be fixed up front or only
//! determinable at log time (e.g. pulled from request-scoped context). A
//! resolver that yields nothing falls back to a fixed sentinel instead of
//! propagating — a deliberate policy: attribution must never fail the call
//! being measured, and a sentinel row is more useful than a dropped one.

use std::sync::Arc;

/// Sentinel user id recorded when no user can be resolved.
pub const UNKNOWN_USER: &str = "unknown_user";

/// Sentinel feature recorded when no feature can be resolved.
pub const UNKNOWN_FEATURE: &str = "unknown_feature";

/// A string attribution value: a literal, or a resolver consulted at log
/// time.
#[derive(Clone)]
pub enum FieldSource {
    /// Fixed value supplied up front.
    Literal(String),
    /// Zero-argument resolver evaluated at log time. `None` or an empty
    /// string falls back to the sentinel.
    Resolver(Arc<dyn Fn() -> Option<String> + Send + Sync>),
}

impl FieldSource {
    /// A fixed literal value.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// A resolver evaluated once per logged record.
    pub fn resolver(f: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Resolver(Arc::new(f))
    }

    /// Resolve to a concrete value, substituting `fallback` when the source
    /// yields nothing.
    pub fn resolve(&self, fallback: &str) -> String {
        let resolved = match self {
            Self::Literal(value) => Some(value.clone()),
            Self::Resolver(f) => f(),
        };
        match resolved {
            Some(value) if !value.is_empty() => value,
            _ => fallback.to_string(),
        }
    }
}

impl std::fmt::Debug for FieldSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for FieldSource {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for FieldSource {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

/// Metadata for logged records: empty, a literal mapping, or a log-time
/// resolver. Resolver failure falls back to an empty mapping.
#[derive(Clone, Default)]
pub enum MetadataSource {
    /// No metadata.
    #[default]
    Empty,
    /// Fixed mapping supplied up front.
    Literal(serde_json::Map<String, serde_json::Value>),
    /// Zero-argument resolver evaluated at log time.
    Resolver(Arc<dyn Fn() -> Option<serde_json::Map<String, serde_json::Value>> + Send + Sync>),
}

impl MetadataSource {
    /// A fixed metadata mapping.
    pub fn literal(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self::Literal(map)
    }

    /// A resolver evaluated once per logged record.
    pub fn resolver(
        f: impl Fn() -> Option<serde_json::Map<String, serde_json::Value>> + Send + Sync + 'static,
    ) -> Self {
        Self::Resolver(Arc::new(f))
    }

    /// Resolve to a concrete mapping, empty when the source yields nothing.
    pub fn resolve(&self) -> serde_json::Map<String, serde_json::Value> {
        match self {
            Self::Empty => serde_json::Map::new(),
            Self::Literal(map) => map.clone(),
            Self::Resolver(f) => f().unwrap_or_default(),
        }
    }
}

impl std::fmt::Debug for MetadataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Literal(map) => f.debug_tuple("Literal").field(map).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}
