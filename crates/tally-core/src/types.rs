// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Tally workspace.

use serde::{Deserialize, Serialize};

/// Token usage extracted from one provider call.
///
/// Counts are `i64` because provider JSON carries signed integers; negative
/// values are representable so the validation layer can reject them loudly
/// instead of wrapping or truncating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallUsage {
    /// Raw model identifier as reported by the provider.
    pub model: String,
    /// Prompt/input token count.
    pub tokens_in: i64,
    /// Completion/output token count.
    pub tokens_out: i64,
}

/// Organization id applied to records when the caller supplies none.
pub const DEFAULT_ORG_ID: &str = "default";
