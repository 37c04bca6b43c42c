// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model pricing tables and cost calculation.
//!
//! Rates are USD per million tokens, keyed by canonical model name. Raw
//! provider identifiers usually carry version or date suffixes
//! (e.g. "gpt-4-0125-preview"), so resolution falls back from exact match to
//! alias prefixes to a longest-key-first fuzzy match. Longest-first matters:
//! it stops short generic keys from shadowing more specific ones.

use tally_core::TallyError;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPricing {
    /// Cost per million input tokens.
    pub input_per_mtok: f64,
    /// Cost per million output tokens.
    pub output_per_mtok: f64,
}

const fn rate(input_per_mtok: f64, output_per_mtok: f64) -> ModelPricing {
    ModelPricing {
        input_per_mtok,
        output_per_mtok,
    }
}

/// Canonical pricing table. Read-only after compilation.
pub const PRICING: &[(&str, ModelPricing)] = &[
    ("gpt-4", rate(30.0, 60.0)),
    ("gpt-4-turbo", rate(10.0, 30.0)),
    ("gpt-4o", rate(5.0, 15.0)),
    ("gpt-4o-mini", rate(0.15, 0.6)),
    ("gpt-3.5-turbo", rate(0.5, 1.5)),
    ("claude-opus-4", rate(15.0, 75.0)),
    ("claude-sonnet-4", rate(3.0, 15.0)),
    ("claude-sonnet-3.5", rate(3.0, 15.0)),
    ("claude-haiku-3.5", rate(0.8, 4.0)),
];

/// Known alternate spellings, matched as prefixes of the normalized input.
const ALIASES: &[(&str, &str)] = &[
    ("claude-3-5-sonnet", "claude-sonnet-3.5"),
    ("claude-3-5-haiku", "claude-haiku-3.5"),
    ("claude-3-opus", "claude-opus-4"),
];

fn normalize_model_name(model: &str) -> String {
    model.trim().to_lowercase().replace('_', "-")
}

fn exact_entry(key: &str) -> Option<&'static (&'static str, ModelPricing)> {
    PRICING.iter().find(|(canonical, _)| *canonical == key)
}

/// Resolve a raw model identifier to its canonical key and pricing.
///
/// Precedence: exact match, then alias prefix, then fuzzy match over
/// canonical keys sorted longest-first (input starts with the key, or the
/// key appears anywhere in the input).
pub fn resolve_pricing(model: &str) -> Result<ModelPricing, TallyError> {
    let normalized = normalize_model_name(model);

    if let Some((_, pricing)) = exact_entry(&normalized) {
        return Ok(*pricing);
    }

    for (alias_prefix, canonical) in ALIASES {
        if normalized.starts_with(alias_prefix)
            && let Some((_, pricing)) = exact_entry(canonical)
        {
            return Ok(*pricing);
        }
    }

    let mut entries: Vec<&(&str, ModelPricing)> = PRICING.iter().collect();
    entries.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));
    for (key, pricing) in entries {
        if normalized.starts_with(key) || normalized.contains(key) {
            return Ok(*pricing);
        }
    }

    Err(TallyError::UnsupportedModel {
        model: model.to_string(),
    })
}

/// Calculate cost in USD from a model identifier and token counts.
///
/// Rejects negative counts before pricing resolution, applies
/// `tokens / 1_000_000 * rate` per direction, and stores no rounding:
/// presentation layers round, the calculator does not.
pub fn calculate_cost(model: &str, tokens_in: i64, tokens_out: i64) -> Result<f64, TallyError> {
    if tokens_in < 0 || tokens_out < 0 {
        return Err(TallyError::InvalidTokenCount {
            message: format!(
                "token counts must be non-negative, got tokens_in={tokens_in}, tokens_out={tokens_out}"
            ),
        });
    }

    let pricing = resolve_pricing(model)?;
    let input = (tokens_in as f64 / 1_000_000.0) * pricing.input_per_mtok;
    let output = (tokens_out as f64 / 1_000_000.0) * pricing.output_per_mtok;
    Ok(input + output)
}
