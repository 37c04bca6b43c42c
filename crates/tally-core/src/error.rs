// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tally cost tracker.

use thiserror::Error;

/// The primary error type used across all Tally crates.
#[derive(Debug, Error)]
pub enum TallyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// No pricing entry matched the given model identifier.
    ///
    /// Never defaulted to a zero cost: an unknown model must surface to the
    /// caller rather than silently producing free usage records.
    #[error("unsupported model for pricing: {model}")]
    UnsupportedModel { model: String },

    /// A negative token or latency count was supplied.
    ///
    /// Rejected before any persistence attempt, so no partial state exists.
    #[error("invalid token count: {message}")]
    InvalidTokenCount { message: String },

    /// Storage backend errors (database open, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A provider response did not carry usage information in any known shape.
    #[error("unrecognized provider response: {message}")]
    UnrecognizedResponse { message: String },
}
