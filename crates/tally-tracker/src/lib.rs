// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Measurement adapter and tracker context for the Tally cost tracker.
//!
//! This crate provides:
//! - **Usage extraction**: the [`UsageExtract`] seam over heterogeneous
//!   provider response shapes
//! - **Call wrappers**: `track_sync`/`track_async` measure latency around a
//!   provider call and append a cost record without ever failing the call
//! - **Tracker context**: the explicit application-lifetime object owning
//!   storage and the default organization id

pub mod fields;
pub mod tracker;
pub mod usage;

pub use fields::{FieldSource, MetadataSource, UNKNOWN_FEATURE, UNKNOWN_USER};
pub use tracker::Tracker;
pub use usage::UsageExtract;
