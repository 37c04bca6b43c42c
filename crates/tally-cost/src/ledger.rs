// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost ledger: the append-only log of usage records in SQLite.
//!
//! Each record attributes one LLM call's cost to a user, a feature, and an
//! organization. Rows are immutable once written; the read side is aggregate
//! queries only (total cost, top users, top features), each accepting the
//! same optional conjunction of filters. All operations go through the
//! single tokio-rusqlite background thread owned by [`Database`].

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_core::TallyError;
use tally_storage::{map_tr_err, Database};
use tracing::info;

/// Storage format for timestamps: ISO-8601 UTC with millisecond precision.
/// Fixed-width, so lexicographic order equals chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A single usage record: one LLM invocation's cost attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecord {
    /// Surrogate key assigned by storage on append. `None` before persistence.
    pub id: Option<i64>,
    /// End user or caller the cost is attributed to.
    pub user_id: String,
    /// Product surface or use case that generated the call.
    pub feature: String,
    /// Raw provider model identifier as given, not normalized.
    pub model: String,
    /// Input token count.
    pub tokens_in: i64,
    /// Output token count.
    pub tokens_out: i64,
    /// Computed cost in USD, full precision.
    pub cost_usd: f64,
    /// Wall-clock latency of the call in milliseconds.
    pub latency_ms: i64,
    /// Creation time of the record, UTC.
    pub timestamp: DateTime<Utc>,
    /// Tenant partition label.
    pub org_id: String,
    /// Caller-supplied context, persisted as a JSON text blob.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Optional conjunction of filters applied to aggregate queries.
///
/// Each predicate applies only if supplied; all-absent matches every row.
/// Predicates combine with AND only. Time bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct CostFilter {
    pub user_id: Option<String>,
    pub feature: Option<String>,
    pub org_id: Option<String>,
    pub model: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl CostFilter {
    /// Build the WHERE clause and its positional parameters.
    ///
    /// All parameters bind as text; timestamps use the storage format so the
    /// comparison is the lexicographic one the column is ordered by.
    fn where_clause(&self) -> (String, Vec<String>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(user_id) = &self.user_id {
            clauses.push("user_id = ?");
            params.push(user_id.clone());
        }
        if let Some(feature) = &self.feature {
            clauses.push("feature = ?");
            params.push(feature.clone());
        }
        if let Some(org_id) = &self.org_id {
            clauses.push("org_id = ?");
            params.push(org_id.clone());
        }
        if let Some(model) = &self.model {
            clauses.push("model = ?");
            params.push(model.clone());
        }
        if let Some(start) = &self.start_time {
            clauses.push("timestamp >= ?");
            params.push(start.format(TIMESTAMP_FORMAT).to_string());
        }
        if let Some(end) = &self.end_time {
            clauses.push("timestamp <= ?");
            params.push(end.format(TIMESTAMP_FORMAT).to_string());
        }

        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", clauses.join(" AND ")), params)
        }
    }
}

/// One group row from `top_users`/`top_features`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    /// The `user_id` or `feature` the rows were grouped by.
    pub key: String,
    /// Summed cost over the group, USD.
    pub total_cost_usd: f64,
    /// Number of records in the group.
    pub call_count: i64,
}

/// Serialize metadata as JSON with all non-ASCII characters escaped,
/// matching the on-disk encoding of the `metadata` column.
fn ascii_escaped_json(
    metadata: &serde_json::Map<String, serde_json::Value>,
) -> Result<String, TallyError> {
    let raw = serde_json::to_string(metadata).map_err(|e| TallyError::Storage {
        source: Box::new(e),
    })?;

    // JSON syntax is ASCII, so any non-ASCII char sits inside a string
    // literal and can be replaced by its \uXXXX escape (UTF-16 units).
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}

/// Persistent, append-only cost ledger backed by SQLite.
pub struct CostLedger {
    db: Database,
}

impl CostLedger {
    /// Create a ledger over an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (creating if necessary) a ledger at the given database path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, TallyError> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open a fresh in-memory ledger. Test use.
    pub async fn open_in_memory() -> Result<Self, TallyError> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    /// The underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Close the ledger's database.
    pub async fn close(self) -> Result<(), TallyError> {
        self.db.close().await
    }

    /// Append one immutable record and return its assigned surrogate id.
    ///
    /// Durable and visible to subsequent reads once this returns. Storage
    /// failures surface immediately; there is no retry.
    pub async fn append(&self, record: &CostRecord) -> Result<i64, TallyError> {
        let user_id = record.user_id.clone();
        let feature = record.feature.clone();
        let model = record.model.clone();
        let tokens_in = record.tokens_in;
        let tokens_out = record.tokens_out;
        let cost_usd = record.cost_usd;
        let latency_ms = record.latency_ms;
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let org_id = record.org_id.clone();
        let metadata = ascii_escaped_json(&record.metadata)?;

        let id = self
            .db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO cost_logs (user_id, feature, model, tokens_in, tokens_out, \
                     cost_usd, latency_ms, timestamp, org_id, metadata) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    rusqlite::params![
                        user_id,
                        feature,
                        model,
                        tokens_in,
                        tokens_out,
                        cost_usd,
                        latency_ms,
                        timestamp,
                        org_id,
                        metadata,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(map_tr_err)?;

        info!(
            id,
            user_id = %record.user_id,
            feature = %record.feature,
            model = %record.model,
            tokens_in = record.tokens_in,
            tokens_out = record.tokens_out,
            cost_usd = record.cost_usd,
            "cost recorded"
        );

        Ok(id)
    }

    /// Sum of `cost_usd` over matching rows. 0.0 when nothing matches.
    pub async fn total_cost(&self, filter: &CostFilter) -> Result<f64, TallyError> {
        let (where_sql, params) = filter.where_clause();
        let query = format!("SELECT COALESCE(SUM(cost_usd), 0.0) FROM cost_logs {where_sql}");

        self.db
            .connection()
            .call(move |conn| {
                conn.query_row(&query, rusqlite::params_from_iter(params), |row| row.get(0))
            })
            .await
            .map_err(map_tr_err)
    }

    /// Top spenders by `user_id`: summed cost descending, truncated to `limit`.
    ///
    /// Tie order between equal sums is storage-defined; callers must not
    /// depend on it.
    pub async fn top_users(
        &self,
        limit: i64,
        filter: &CostFilter,
    ) -> Result<Vec<GroupTotal>, TallyError> {
        self.top_by("user_id", limit, filter).await
    }

    /// Top spenders by `feature`: summed cost descending, truncated to `limit`.
    pub async fn top_features(
        &self,
        limit: i64,
        filter: &CostFilter,
    ) -> Result<Vec<GroupTotal>, TallyError> {
        self.top_by("feature", limit, filter).await
    }

    async fn top_by(
        &self,
        column: &'static str,
        limit: i64,
        filter: &CostFilter,
    ) -> Result<Vec<GroupTotal>, TallyError> {
        let (where_sql, params) = filter.where_clause();
        // `column` is one of two compile-time literals and `limit` is an
        // integer, so interpolation cannot inject SQL.
        let query = format!(
            "SELECT {column}, SUM(cost_usd) AS total, COUNT(*) AS call_count \
             FROM cost_logs {where_sql} \
             GROUP BY {column} ORDER BY total DESC LIMIT {}",
            limit.max(0)
        );

        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
                    Ok(GroupTotal {
                        key: row.get(0)?,
                        total_cost_usd: row.get(1)?,
                        call_count: row.get(2)?,
                    })
                })?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)
    }
}
