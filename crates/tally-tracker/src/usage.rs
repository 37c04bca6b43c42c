// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token usage extraction from provider response shapes.
//!
//! Provider SDKs disagree on where token counts live: OpenAI-style
//! responses use `usage.prompt_tokens`/`usage.completion_tokens`,
//! Anthropic-style responses use `usage.input_tokens`/`usage.output_tokens`.
//! The [`UsageExtract`] trait is the seam: one implementation per known
//! response shape. A JSON mapping is covered out of the box; typed SDK
//! response structs implement the trait themselves.
//!
//! A shape that carries no usage information fails with
//! `TallyError::UnrecognizedResponse` rather than silently logging zero
//! tokens.

use tally_core::{CallUsage, TallyError};

/// Fallback model label when a response carries usage but no model field.
const UNKNOWN_MODEL: &str = "unknown";

/// Extract `(model, tokens_in, tokens_out)` from a provider response.
pub trait UsageExtract {
    fn extract_usage(&self) -> Result<CallUsage, TallyError>;
}

impl UsageExtract for serde_json::Value {
    fn extract_usage(&self) -> Result<CallUsage, TallyError> {
        let obj = self
            .as_object()
            .ok_or_else(|| TallyError::UnrecognizedResponse {
                message: "response is not a JSON object".to_string(),
            })?;

        let model = obj
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or(UNKNOWN_MODEL)
            .to_string();

        let usage = obj
            .get("usage")
            .and_then(|v| v.as_object())
            .ok_or_else(|| TallyError::UnrecognizedResponse {
                message: "response does not contain usage information".to_string(),
            })?;

        Ok(CallUsage {
            model,
            tokens_in: int_field(usage, &["prompt_tokens", "input_tokens"]),
            tokens_out: int_field(usage, &["completion_tokens", "output_tokens"]),
        })
    }
}

/// First present field wins; a present but non-integer value counts as 0.
fn int_field(usage: &serde_json::Map<String, serde_json::Value>, names: &[&str]) -> i64 {
    for name in names {
        if let Some(value) = usage.get(*name) {
            return value.as_i64().unwrap_or(0);
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn openai_shape_extracts() {
        let response = json!({
            "model": "gpt-4o-mini",
            "usage": { "prompt_tokens": 250, "completion_tokens": 125 }
        });
        let usage = response.extract_usage().unwrap();
        assert_eq!(usage.model, "gpt-4o-mini");
        assert_eq!(usage.tokens_in, 250);
        assert_eq!(usage.tokens_out, 125);
    }

    #[test]
    fn anthropic_shape_extracts() {
        let response = json!({
            "model": "claude-sonnet-3.5",
            "usage": { "input_tokens": 400, "output_tokens": 90 }
        });
        let usage = response.extract_usage().unwrap();
        assert_eq!(usage.model, "claude-sonnet-3.5");
        assert_eq!(usage.tokens_in, 400);
        assert_eq!(usage.tokens_out, 90);
    }

    #[test]
    fn openai_spelling_wins_when_both_present() {
        let response = json!({
            "model": "gpt-4o",
            "usage": { "prompt_tokens": 10, "input_tokens": 99, "completion_tokens": 5 }
        });
        let usage = response.extract_usage().unwrap();
        assert_eq!(usage.tokens_in, 10);
        assert_eq!(usage.tokens_out, 5);
    }

    #[test]
    fn missing_model_defaults_to_unknown() {
        let response = json!({
            "usage": { "prompt_tokens": 1, "completion_tokens": 2 }
        });
        let usage = response.extract_usage().unwrap();
        assert_eq!(usage.model, "unknown");
    }

    #[test]
    fn missing_usage_is_rejected_not_zeroed() {
        let response = json!({ "model": "gpt-4o" });
        let err = response.extract_usage().unwrap_err();
        assert!(matches!(err, TallyError::UnrecognizedResponse { .. }));
    }

    #[test]
    fn non_object_response_is_rejected() {
        let response = json!("just a string");
        let err = response.extract_usage().unwrap_err();
        assert!(matches!(err, TallyError::UnrecognizedResponse { .. }));
    }

    #[test]
    fn non_integer_counts_fall_back_to_zero() {
        let response = json!({
            "model": "gpt-4o",
            "usage": { "prompt_tokens": "lots", "completion_tokens": 5 }
        });
        let usage = response.extract_usage().unwrap();
        assert_eq!(usage.tokens_in, 0);
        assert_eq!(usage.tokens_out, 5);
    }
}
