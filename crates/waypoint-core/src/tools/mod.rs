//! Guarded, audited execution of individual tool calls.
//!
//! Every call to [`ToolEngine::execute`] goes through the same pipeline:
//!
//! ```text
//! resolve name ─▶ permission gate ─▶ confirmation ─▶ checkpoint (writes)
//!                                                        │
//!             audit ◀── truncate ◀── retry(transient) ◀──┘
//! ```
//!
//! Failures at any stage come back as a [`ToolResult`] with
//! `success == false`; `execute` never returns an error. Rejections by the
//! gate or the confirmation handler happen before any backing store call.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use serde_json::json;
//! use waypoint_core::{store::MemoryStore, tools::ToolEngineBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let engine = ToolEngineBuilder::new(store.clone())
//!     .with_workspace_root("/work")
//!     .auto_approve()
//!     .build()?;
//!
//! let written = engine
//!     .execute("workspace_writeFile", json!({"path": "notes.md", "content": "hi"}))
//!     .await;
//! assert!(written.success);
//!
//! // Undo the write
//! let id = written.checkpoint_id.expect("writes are checkpointed");
//! engine.rollback(&id).await?;
//! assert!(!store.contains("/work/notes.md"));
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Instant};

use jiff::Timestamp;
use log::{debug, info, warn};
use serde_json::{json, Value};

use crate::{
    checkpoint::{self, CheckpointStore, RollbackReport},
    error::{Result, WaypointError},
    models::{Checkpoint, ToolCallRecord, ToolErrorKind, ToolResult},
    paths,
    store::BackingStore,
};

pub mod audit;
pub mod builder;
pub mod catalog;
pub mod guard;
mod handlers;
pub mod retry;
pub mod services;
pub mod summary;
pub mod truncate;

pub use builder::{ToolEngineBuilder, ToolEngineConfig};
pub use catalog::{PermissionLevel, ToolName, ToolPermission, ToolRisk};
pub use retry::RetryPolicy;
pub use services::{EditorServices, Position};
pub use summary::SummaryLimits;

use handlers::{parse, CallError, WriteArgs};

/// Asked before running a tool that requires confirmation.
pub type ConfirmHandler = Arc<dyn Fn(ToolName, &Value) -> bool + Send + Sync>;

/// Runs catalog tools against a backing store with guard rails.
pub struct ToolEngine {
    pub(crate) store: Arc<dyn BackingStore>,
    pub(crate) services: Option<Arc<dyn EditorServices>>,
    pub(crate) config: ToolEngineConfig,
    guard: guard::PermissionGuard,
    confirm: Option<ConfirmHandler>,
    checkpoints: CheckpointStore,
    audit: audit::AuditLog,
    pub(crate) terminal: audit::TerminalLog,
}

impl ToolEngine {
    pub fn config(&self) -> &ToolEngineConfig {
        &self.config
    }

    /// Runs `tool` with `args` and audits the outcome.
    pub async fn execute(&self, tool: &str, args: Value) -> ToolResult {
        let started = Instant::now();
        let call_id = format!("call-{}", uuid::Uuid::new_v4().simple());
        let args = if args.is_null() { json!({}) } else { args };

        let result = self.run_call(tool, &args, &call_id).await;

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        if result.success {
            info!("{tool} succeeded in {duration_ms}ms ({} attempts)", result.attempts);
        } else {
            info!(
                "{tool} failed in {duration_ms}ms: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        self.audit.push(ToolCallRecord {
            id: call_id,
            tool: tool.to_string(),
            args,
            result: result.clone(),
            duration_ms,
            timestamp: Timestamp::now(),
            checkpoint_id: result.checkpoint_id.clone(),
        });
        result
    }

    async fn run_call(&self, tool: &str, args: &Value, call_id: &str) -> ToolResult {
        let name = match tool.parse::<ToolName>() {
            Ok(name) => name,
            Err(e) => return ToolResult::failure(ToolErrorKind::UnknownTool, e),
        };
        if !args.is_object() {
            return ToolResult::failure(
                ToolErrorKind::InvalidArgs,
                "Tool arguments must be a JSON object",
            );
        }
        if let Err(reason) = self.guard.check(args) {
            warn!("{name} blocked: {reason}");
            return ToolResult::failure(ToolErrorKind::Blocked, reason);
        }
        if name.permission().require_confirmation && !self.confirmed(name, args) {
            return ToolResult::failure(
                ToolErrorKind::Rejected,
                format!("{name} requires confirmation and was not approved"),
            );
        }

        let checkpoint_id = if name == ToolName::WriteFile {
            match parse::<WriteArgs>(args) {
                Ok(write) => Some(self.checkpoint_write(&write.path, call_id).await),
                Err(e) => return ToolResult::failure(ToolErrorKind::InvalidArgs, e.to_string()),
            }
        } else {
            None
        };

        let (outcome, attempts) = self.config.retry.run(|| self.dispatch(name, args)).await;
        let mut result = match outcome {
            Ok(data) => {
                let (data, truncated) = truncate::truncate_result(data, self.config.result_budget);
                ToolResult {
                    truncated,
                    ..ToolResult::ok(data)
                }
            }
            Err(CallError::InvalidArgs(message)) => {
                ToolResult::failure(ToolErrorKind::InvalidArgs, message)
            }
            Err(CallError::Store(e)) => ToolResult::from_store_error(&e),
            Err(CallError::CommandFailed { message, output }) => {
                let (data, truncated) =
                    truncate::truncate_result(output, self.config.result_budget);
                ToolResult {
                    data: Some(data),
                    truncated,
                    ..ToolResult::failure(ToolErrorKind::CommandFailed, message)
                }
            }
        };
        result.attempts = attempts;
        result.checkpoint_id = checkpoint_id;
        result
    }

    fn confirmed(&self, tool: ToolName, args: &Value) -> bool {
        match &self.confirm {
            Some(handler) => handler(tool, args),
            None => false,
        }
    }

    async fn checkpoint_write(&self, path: &str, call_id: &str) -> String {
        let resolved = paths::resolve(&self.config.workspace_root, path);
        let cp = checkpoint::capture(
            self.store.as_ref(),
            call_id,
            [resolved],
            self.config.call_timeout,
        )
        .await;
        let id = cp.id.clone();
        debug!("Checkpoint {id} protects {path}");
        self.checkpoints.insert(id.clone(), cp);
        id
    }

    /// Restores the file a write changed and discards its checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::CheckpointNotFound` if the checkpoint was
    /// confirmed, already rolled back, or never existed. Nothing is touched
    /// in that case.
    pub async fn rollback(&self, checkpoint_id: &str) -> Result<RollbackReport> {
        let cp = self
            .checkpoints
            .remove(checkpoint_id)
            .ok_or_else(|| WaypointError::CheckpointNotFound {
                id: checkpoint_id.to_string(),
            })?;
        info!("Rolling back checkpoint {checkpoint_id}");
        let mut report =
            checkpoint::restore(self.store.as_ref(), &cp, &[], self.config.call_timeout).await;
        report.undone = vec![cp.id];
        Ok(report)
    }

    /// Rolls back every outstanding checkpoint, newest first.
    pub async fn rollback_all(&self) -> RollbackReport {
        let mut report = RollbackReport::default();
        for (id, cp) in self.checkpoints.drain_newest_first() {
            let mut one =
                checkpoint::restore(self.store.as_ref(), &cp, &[], self.config.call_timeout).await;
            one.undone = vec![id];
            report.merge(one);
        }
        info!("Rolled back {} checkpoints", report.undone.len());
        report
    }

    /// Accepts a write; its checkpoint is discarded. Returns `false` when
    /// there was nothing to discard.
    pub fn confirm_checkpoint(&self, checkpoint_id: &str) -> bool {
        self.checkpoints.confirm(checkpoint_id)
    }

    /// Outstanding checkpoints, oldest first.
    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        self.checkpoints.list()
    }

    /// Audited calls, oldest first.
    pub fn audit_log(&self) -> Vec<ToolCallRecord> {
        self.audit.records()
    }

    /// The most recent `n` audited calls, oldest first.
    pub fn recent_calls(&self, n: usize) -> Vec<ToolCallRecord> {
        self.audit.tail(n)
    }
}

impl std::fmt::Debug for ToolEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEngine")
            .field("config", &self.config)
            .field("services", &self.services.is_some())
            .field("checkpoints", &self.checkpoints.len())
            .field("audited", &self.audit.len())
            .finish()
    }
}
