// SPDX-FileCopyrightText: 2026 Tally Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: init storage, wrap calls, query aggregates.

use serde_json::json;
use tally_core::{CallUsage, TallyError};
use tally_cost::CostFilter;
use tally_tracker::{FieldSource, MetadataSource, Tracker, UsageExtract};

/// A typed SDK-style response implementing the extraction seam itself.
struct MockOpenAiResponse {
    model: &'static str,
    prompt_tokens: i64,
    completion_tokens: i64,
}

impl UsageExtract for MockOpenAiResponse {
    fn extract_usage(&self) -> Result<CallUsage, TallyError> {
        Ok(CallUsage {
            model: self.model.to_string(),
            tokens_in: self.prompt_tokens,
            tokens_out: self.completion_tokens,
        })
    }
}

#[tokio::test]
async fn track_sync_records_wrapped_call() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = Tracker::init(dir.path().join("costs.db"), "org-wrapper")
        .await
        .unwrap();

    let response = tracker
        .track_sync(
            FieldSource::literal("user-1"),
            FieldSource::literal("chat"),
            MetadataSource::default(),
            || MockOpenAiResponse {
                model: "gpt-4o-mini",
                prompt_tokens: 250,
                completion_tokens: 125,
            },
        )
        .await;
    assert_eq!(response.model, "gpt-4o-mini");

    let filter = CostFilter {
        user_id: Some("user-1".to_string()),
        feature: Some("chat".to_string()),
        ..Default::default()
    };
    let total = tracker.ledger().total_cost(&filter).await.unwrap();
    assert!(total > 0.0);
}

#[tokio::test]
async fn track_async_records_json_response() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = Tracker::init(dir.path().join("costs.db"), "org-wrapper")
        .await
        .unwrap();

    let response = tracker
        .track_async(
            FieldSource::literal("user-2"),
            FieldSource::literal("analysis"),
            MetadataSource::default(),
            || async {
                json!({
                    "model": "claude-sonnet-3.5",
                    "usage": { "input_tokens": 400, "output_tokens": 90 }
                })
            },
        )
        .await;
    assert_eq!(response["model"], "claude-sonnet-3.5");

    let filter = CostFilter {
        user_id: Some("user-2".to_string()),
        feature: Some("analysis".to_string()),
        ..Default::default()
    };
    let total = tracker.ledger().total_cost(&filter).await.unwrap();
    let expected = (400.0 / 1_000_000.0) * 3.0 + (90.0 / 1_000_000.0) * 15.0;
    assert!((total - expected).abs() < 1e-12);
}

#[tokio::test]
async fn unusable_response_skips_entry_but_returns_result() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let dir = tempfile::tempdir().unwrap();
    let tracker = Tracker::init(dir.path().join("costs.db"), "org-wrapper")
        .await
        .unwrap();

    // No usage field anywhere: nothing is logged, the caller still gets
    // the response back.
    let response = tracker
        .track_sync(
            FieldSource::literal("user-3"),
            FieldSource::literal("chat"),
            MetadataSource::default(),
            || json!({ "model": "gpt-4o" }),
        )
        .await;
    assert_eq!(response["model"], "gpt-4o");

    let total = tracker
        .ledger()
        .total_cost(&CostFilter::default())
        .await
        .unwrap();
    assert!((total - 0.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn resolver_fields_and_sentinel_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = Tracker::init(dir.path().join("costs.db"), "org-wrapper")
        .await
        .unwrap();

    tracker
        .track_sync(
            FieldSource::resolver(|| Some("resolved-user".to_string())),
            FieldSource::resolver(|| None),
            MetadataSource::resolver(|| None),
            || MockOpenAiResponse {
                model: "gpt-4o-mini",
                prompt_tokens: 10,
                completion_tokens: 10,
            },
        )
        .await;

    let resolved = CostFilter {
        user_id: Some("resolved-user".to_string()),
        ..Default::default()
    };
    assert!(tracker.ledger().total_cost(&resolved).await.unwrap() > 0.0);

    // The failed feature resolver fell back to the sentinel.
    let sentinel = CostFilter {
        feature: Some(tally_tracker::UNKNOWN_FEATURE.to_string()),
        ..Default::default()
    };
    assert!(tracker.ledger().total_cost(&sentinel).await.unwrap() > 0.0);
}

#[tokio::test]
async fn aggregate_scenario_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = Tracker::init(dir.path().join("costs.db"), "org-1")
        .await
        .unwrap();

    tracker
        .log_manual("alice", "chat", "gpt-4o-mini", 100, 200, 120, None, None)
        .await
        .unwrap();
    tracker
        .log_manual("bob", "summary", "claude-sonnet-3.5", 300, 500, 90, None, None)
        .await
        .unwrap();
    tracker
        .log_manual("alice", "summary", "gpt-4o-mini", 200, 100, 70, None, None)
        .await
        .unwrap();

    let org_filter = CostFilter {
        org_id: Some("org-1".to_string()),
        ..Default::default()
    };
    let total = tracker.ledger().total_cost(&org_filter).await.unwrap();
    // alice/chat: 100/1M*0.15 + 200/1M*0.6; bob: 300/1M*3 + 500/1M*15;
    // alice/summary: 200/1M*0.15 + 100/1M*0.6
    let expected = (100.0 * 0.15 + 200.0 * 0.6 + 300.0 * 3.0 + 500.0 * 15.0
        + 200.0 * 0.15 + 100.0 * 0.6)
        / 1_000_000.0;
    assert!((total - expected).abs() < 1e-10);

    let top_users = tracker.ledger().top_users(2, &org_filter).await.unwrap();
    assert_eq!(top_users[0].key, "bob");
    assert_eq!(top_users[0].call_count, 1);
    assert_eq!(top_users[1].key, "alice");
    assert_eq!(top_users[1].call_count, 2);

    let top_features = tracker
        .ledger()
        .top_features(2, &org_filter)
        .await
        .unwrap();
    assert_eq!(top_features[0].key, "summary");
    assert_eq!(top_features[1].key, "chat");
}

#[tokio::test]
async fn from_config_uses_configured_path_and_org() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("configured.db");

    let toml = format!(
        "[storage]\npath = \"{}\"\n\n[cost]\norg_id = \"org-cfg\"\n",
        db_path.display()
    );
    let config = tally_config::load_config_from_str(&toml).unwrap();

    let tracker = Tracker::from_config(&config).await.unwrap();
    assert_eq!(tracker.default_org(), "org-cfg");
    let record = tracker
        .log_manual("alice", "chat", "gpt-4", 10, 10, 0, None, None)
        .await
        .unwrap();
    assert_eq!(record.org_id, "org-cfg");
    assert!(db_path.exists());
}

#[tokio::test]
async fn metadata_round_trips_through_wrapper() {
    let dir = tempfile::tempdir().unwrap();
    let tracker = Tracker::init(dir.path().join("costs.db"), "org-1")
        .await
        .unwrap();

    let mut meta = serde_json::Map::new();
    meta.insert("env".to_string(), json!("test"));
    meta.insert("session".to_string(), json!(42));

    tracker
        .track_sync(
            FieldSource::literal("alice"),
            FieldSource::literal("chat"),
            MetadataSource::literal(meta),
            || MockOpenAiResponse {
                model: "gpt-4o-mini",
                prompt_tokens: 10,
                completion_tokens: 10,
            },
        )
        .await;

    let stored: String = tracker
        .ledger()
        .database()
        .connection()
        .call(|conn| -> Result<String, rusqlite::Error> {
            conn.query_row("SELECT metadata FROM cost_logs", [], |row| row.get(0))
        })
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(parsed["env"], "test");
    assert_eq!(parsed["session"], 42);
}
