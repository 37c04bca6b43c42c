// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing resolution, cost calculation, and the cost ledger for Tally.
//!
//! This crate provides:
//! - **Pricing resolver**: canonical per-model USD rates with alias and
//!   fuzzy matching for versioned provider identifiers
//! - **Cost calculator**: pure arithmetic from token counts to USD
//! - **Cost ledger**: append-only SQLite log of usage records with filtered
//!   aggregate queries

pub mod ledger;
pub mod pricing;

pub use ledger::{CostFilter, CostLedger, CostRecord, GroupTotal};
pub use pricing::{calculate_cost, resolve_pricing, ModelPricing, PRICING};
