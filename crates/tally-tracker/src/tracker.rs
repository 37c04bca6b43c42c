// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tracker context: storage handle, default org, and the
//! measure-and-append path.
//!
//! Applications construct one `Tracker` for their lifetime and pass (or
//! inject) it into every call site that logs usage — there is no hidden
//! global instance. The lazy-default convenience survives as
//! [`Tracker::open_default`], an explicit factory.

use std::future::Future;
use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tally_config::TallyConfig;
use tally_core::{TallyError, DEFAULT_ORG_ID};
use tally_cost::{calculate_cost, CostLedger, CostRecord};
use tally_storage::default_db_path;
use tracing::warn;

use crate::fields::{FieldSource, MetadataSource, UNKNOWN_FEATURE, UNKNOWN_USER};
use crate::usage::UsageExtract;

/// Application-lifetime cost tracking context.
pub struct Tracker {
    ledger: CostLedger,
    default_org: String,
}

impl Tracker {
    /// Initialize storage at the given path with a default organization id.
    ///
    /// Parent directories are created as needed; opening an existing store
    /// is idempotent.
    pub async fn init(
        path: impl AsRef<Path>,
        org_id: impl Into<String>,
    ) -> Result<Self, TallyError> {
        Ok(Self {
            ledger: CostLedger::open(path).await?,
            default_org: org_id.into(),
        })
    }

    /// Open a tracker at the platform-default database path with the
    /// default organization id.
    pub async fn open_default() -> Result<Self, TallyError> {
        Self::init(default_db_path(), DEFAULT_ORG_ID).await
    }

    /// Build a tracker from loaded configuration.
    pub async fn from_config(config: &TallyConfig) -> Result<Self, TallyError> {
        match &config.storage.path {
            Some(path) => Self::init(path, &config.cost.org_id).await,
            None => Self::init(default_db_path(), &config.cost.org_id).await,
        }
    }

    /// The underlying ledger, for aggregate queries.
    pub fn ledger(&self) -> &CostLedger {
        &self.ledger
    }

    /// The organization id applied when a record supplies none.
    pub fn default_org(&self) -> &str {
        &self.default_org
    }

    /// Close the tracker's storage.
    pub async fn close(self) -> Result<(), TallyError> {
        self.ledger.close().await
    }

    /// Manually log one usage record when no provider response is at hand.
    ///
    /// Validates non-negative counts and latency, computes cost from the
    /// pricing table, persists, and returns the record with its assigned id.
    /// This path fails loudly: callers who want the swallow-and-continue
    /// policy use the `track_*` wrappers.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_manual(
        &self,
        user_id: &str,
        feature: &str,
        model: &str,
        tokens_in: i64,
        tokens_out: i64,
        latency_ms: i64,
        metadata: Option<serde_json::Map<String, serde_json::Value>>,
        org_id: Option<&str>,
    ) -> Result<CostRecord, TallyError> {
        if latency_ms < 0 {
            return Err(TallyError::InvalidTokenCount {
                message: format!("latency_ms must be non-negative, got {latency_ms}"),
            });
        }
        // Rejects negative counts before anything touches storage.
        let cost_usd = calculate_cost(model, tokens_in, tokens_out)?;

        let mut record = CostRecord {
            id: None,
            user_id: user_id.to_string(),
            feature: feature.to_string(),
            model: model.to_string(),
            tokens_in,
            tokens_out,
            cost_usd,
            latency_ms,
            timestamp: Utc::now(),
            org_id: org_id.unwrap_or(&self.default_org).to_string(),
            metadata: metadata.unwrap_or_default(),
        };
        let id = self.ledger.append(&record).await?;
        record.id = Some(id);
        Ok(record)
    }

    /// Wrap a plain (non-suspending) provider call: measure latency, run it,
    /// extract usage from its return value, and log.
    ///
    /// The call's result is always returned; logging failures degrade to a
    /// `tracing::warn` and a skipped entry.
    pub async fn track_sync<F, R>(
        &self,
        user_id: FieldSource,
        feature: FieldSource,
        metadata: MetadataSource,
        call: F,
    ) -> R
    where
        F: FnOnce() -> R,
        R: UsageExtract,
    {
        let start = Instant::now();
        let response = call();
        let latency_ms = start.elapsed().as_millis() as i64;
        self.log_response(&response, &user_id, &feature, &metadata, latency_ms)
            .await;
        response
    }

    /// Wrap a suspending provider call. Identical to [`Self::track_sync`]
    /// except the call is awaited; pick the entry point matching your call
    /// style.
    pub async fn track_async<F, Fut, R>(
        &self,
        user_id: FieldSource,
        feature: FieldSource,
        metadata: MetadataSource,
        call: F,
    ) -> R
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
        R: UsageExtract,
    {
        let start = Instant::now();
        let response = call().await;
        let latency_ms = start.elapsed().as_millis() as i64;
        self.log_response(&response, &user_id, &feature, &metadata, latency_ms)
            .await;
        response
    }

    /// Shared measure-and-append funnel for both wrappers.
    async fn log_response<R: UsageExtract>(
        &self,
        response: &R,
        user_id: &FieldSource,
        feature: &FieldSource,
        metadata: &MetadataSource,
        latency_ms: i64,
    ) {
        let outcome = match response.extract_usage() {
            Ok(usage) => {
                self.log_manual(
                    &user_id.resolve(UNKNOWN_USER),
                    &feature.resolve(UNKNOWN_FEATURE),
                    &usage.model,
                    usage.tokens_in,
                    usage.tokens_out,
                    latency_ms,
                    Some(metadata.resolve()),
                    None,
                )
                .await
                .map(|_| ())
            }
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            warn!(error = %err, "failed to record cost log, skipping entry");
        }
    }
}
