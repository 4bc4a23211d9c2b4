mod common;

use std::{sync::Arc, time::Duration};

use common::{create_test_engine, path, ROOT};
use serde_json::json;
use tempfile::TempDir;
use tokio::time::Instant;
use waypoint_core::{
    store::{MemoryStore, StoreError, StoreErrorKind, StoreOp},
    tools::{RetryPolicy, ToolEngineBuilder},
    LocalStore, ToolErrorKind, WaypointError,
};

#[tokio::test]
async fn test_blocked_env_write_never_reaches_store() {
    let store = Arc::new(MemoryStore::with_files([(path(".env"), "TOKEN=abc")]));
    let engine = create_test_engine(&store);

    let result = engine
        .execute(
            "workspace_writeFile",
            json!({"path": ".env", "content": "TOKEN=stolen"}),
        )
        .await;

    assert!(!result.success);
    assert_eq!(result.error_kind, Some(ToolErrorKind::Blocked));
    assert!(result.checkpoint_id.is_none());
    assert!(store.calls_for(StoreOp::Write).is_empty());
    assert!(store.calls_for(StoreOp::Read).is_empty());
    assert_eq!(store.file(&path(".env")).as_deref(), Some("TOKEN=abc"));

    // Blocked calls are still audited
    let log = engine.audit_log();
    assert_eq!(log.len(), 1);
    assert!(log[0].result.is_rejection());
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_retried_with_linear_backoff() {
    let store = Arc::new(MemoryStore::with_files([(path("a.txt"), "A")]));
    store.fail_times(
        StoreOp::Read,
        Some(&path("a.txt")),
        StoreError::new(StoreErrorKind::Timeout, "slow"),
        2,
    );
    let engine = ToolEngineBuilder::new(store.clone())
        .with_workspace_root(ROOT)
        .build()
        .expect("Failed to build engine");

    let started = Instant::now();
    let result = engine
        .execute("workspace_readFile", json!({"path": "a.txt"}))
        .await;

    assert!(result.success);
    assert_eq!(result.attempts, 3);
    // 500ms before the second attempt, 1000ms before the third
    assert_eq!(started.elapsed(), Duration::from_millis(1_500));
    assert_eq!(store.calls_for(StoreOp::Read).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_reports_last_error() {
    let store = Arc::new(MemoryStore::with_files([(path("a.txt"), "A")]));
    store.fail(
        StoreOp::Read,
        None,
        StoreError::new(StoreErrorKind::Network, "unreachable"),
    );
    let engine = ToolEngineBuilder::new(store.clone())
        .with_workspace_root(ROOT)
        .build()
        .expect("Failed to build engine");

    let result = engine
        .execute("workspace_readFile", json!({"path": "a.txt"}))
        .await;

    assert!(!result.success);
    assert_eq!(result.attempts, 3);
    assert_eq!(
        result.error_kind,
        Some(ToolErrorKind::Backend(StoreErrorKind::Network))
    );
}

#[tokio::test]
async fn test_permanent_failure_not_retried() {
    let store = Arc::new(MemoryStore::with_files([(path("a.txt"), "A")]));
    store.fail(
        StoreOp::Read,
        None,
        StoreError::new(StoreErrorKind::PermissionDenied, "denied"),
    );
    let engine = ToolEngineBuilder::new(store.clone())
        .with_workspace_root(ROOT)
        .with_retry(RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(1),
        })
        .build()
        .expect("Failed to build engine");

    let result = engine
        .execute("workspace_readFile", json!({"path": "a.txt"}))
        .await;
    assert_eq!(result.attempts, 1);
    assert_eq!(store.calls_for(StoreOp::Read).len(), 1);
}

#[tokio::test]
async fn test_large_file_read_returns_summary() {
    let content: String = (0..600)
        .map(|i| {
            if i % 100 == 0 {
                format!("pub fn section_{i}() {{}}\n")
            } else {
                format!("// line {i}\n")
            }
        })
        .collect();
    let store = Arc::new(MemoryStore::with_files([(path("big.rs"), content)]));
    let engine = create_test_engine(&store);

    let result = engine
        .execute("workspace_readFile", json!({"path": "big.rs"}))
        .await;
    let data = result.data.expect("read should return data");

    assert_eq!(data["totalLines"], 600);
    assert!(data.get("content").is_none());
    let summary = &data["summary"];
    assert_eq!(summary["declarations"].as_array().map(Vec::len), Some(6));
    assert_eq!(summary["declarations"][1]["line"], 101);
    let line_count = |key: &str| summary[key].as_str().map(|s| s.lines().count());
    assert_eq!(line_count("head"), Some(50));
    assert_eq!(line_count("tail"), Some(20));
    assert!(!result.truncated);
    assert!(data["hint"]
        .as_str()
        .unwrap_or_default()
        .contains("startLine"));

    // A range read still returns the requested lines verbatim
    let range = engine
        .execute(
            "workspace_readFile",
            json!({"path": "big.rs", "startLine": 101, "endLine": 101}),
        )
        .await;
    assert_eq!(
        range.data.expect("range should return data")["content"],
        "pub fn section_100() {}"
    );
}

#[tokio::test]
async fn test_confirm_then_rollback_fails_without_side_effects() {
    let store = Arc::new(MemoryStore::with_files([(path("a.txt"), "before")]));
    let engine = create_test_engine(&store);

    let result = engine
        .execute(
            "workspace_writeFile",
            json!({"path": "a.txt", "content": "after"}),
        )
        .await;
    let id = result.checkpoint_id.expect("write should be checkpointed");

    assert!(engine.confirm_checkpoint(&id));
    assert!(!engine.confirm_checkpoint(&id));

    let writes_before = store.calls_for(StoreOp::Write).len();
    match engine.rollback(&id).await {
        Err(WaypointError::CheckpointNotFound { id: missing }) => assert_eq!(missing, id),
        other => panic!("expected CheckpointNotFound, got {other:?}"),
    }
    assert_eq!(store.calls_for(StoreOp::Write).len(), writes_before);
    assert_eq!(store.file(&path("a.txt")).as_deref(), Some("after"));
}

#[tokio::test]
async fn test_local_store_tools_end_to_end() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let root = dir.path().to_string_lossy().into_owned();
    std::fs::write(dir.path().join("notes.md"), "draft").expect("Failed to write notes");

    let engine = ToolEngineBuilder::new(Arc::new(LocalStore::new()))
        .with_workspace_root(&root)
        .auto_approve()
        .build()
        .expect("Failed to build engine");

    let write = engine
        .execute(
            "workspace_writeFile",
            json!({"path": "notes.md", "content": "final"}),
        )
        .await;
    assert!(write.success, "{write:?}");
    let created = engine
        .execute(
            "workspace_writeFile",
            json!({"path": "out/report.txt", "content": "ok"}),
        )
        .await;
    assert!(created.success, "{created:?}");

    let listing = engine.execute("workspace_listFiles", json!({})).await;
    let entries = listing.data.expect("listing should return data")["entries"].clone();
    assert_eq!(entries[0]["name"], "out");
    assert_eq!(entries[0]["isDir"], true);

    let echo = engine
        .execute("terminal_runCommand", json!({"command": "cat notes.md"}))
        .await;
    assert_eq!(echo.data.expect("command should return data")["stdout"], "final");

    let report = engine.rollback_all().await;
    assert!(report.is_complete(), "{report:?}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("notes.md")).expect("notes missing"),
        "draft"
    );
    assert!(!dir.path().join("out/report.txt").exists());
}
