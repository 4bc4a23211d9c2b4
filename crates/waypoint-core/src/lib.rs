//! Core library for checkpointed workspace changes.
//!
//! Two engines share one backing store abstraction:
//!
//! - The **plan executor** ([`executor`]) runs a multi-file change as an
//!   ordered list of steps. Before a step mutates anything its files are
//!   snapshotted; when a step fails, applied steps are rolled back newest
//!   first. Runs can be paused between steps, resumed and stopped.
//! - The **tool engine** ([`tools`]) runs single, named tool calls (read,
//!   write, search, run a command, git, editor queries) behind a permission
//!   gate, optional confirmation, retry of transient failures, result
//!   truncation and an audit log. Every write is checkpointed and can be
//!   rolled back or confirmed.
//!
//! Plans are produced from a [`params::CreatePlan`] request by the
//! [`generator`], which validates them and attaches an impact analysis.
//!
//! # Display Architecture
//!
//! Domain models implement [`std::fmt::Display`] as markdown; the
//! [`display`] module adds wrappers for collections and outcomes. The CLI
//! renders that markdown in the terminal and the MCP server returns it as
//! text.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use waypoint_core::{
//!     models::{Action, PlanStatus},
//!     params::{CreatePlan, StepSpec},
//!     store::MemoryStore,
//!     ExecutorBuilder, PlanGenerator,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::with_files([("/work/src/lib.rs", "")]));
//! let executor = ExecutorBuilder::new(store.clone())
//!     .with_workspace_root("/work")
//!     .build();
//!
//! let mut plan = PlanGenerator::new().generate(&CreatePlan {
//!     name: "Add helper".to_string(),
//!     steps: vec![StepSpec {
//!         name: "Create module".to_string(),
//!         actions: vec![
//!             Action::create("src/helper.rs", "pub fn help() {}\n"),
//!             Action::modify("src/lib.rs", "pub mod helper;\n"),
//!         ],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! })?;
//! PlanGenerator::approve(&mut plan)?;
//!
//! let finished = executor.execute(&plan).await?;
//! assert_eq!(finished.status, PlanStatus::Completed);
//! assert!(store.contains("/work/src/helper.rs"));
//! # Ok(())
//! # }
//! ```

pub mod checkpoint;
pub mod config;
pub mod display;
pub mod error;
pub mod executor;
pub mod generator;
pub mod models;
pub mod params;
pub mod paths;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use checkpoint::{RollbackFailure, RollbackReport};
pub use config::Settings;
pub use display::{OperationStatus, RollbackResult, RunResult, Steps, ToolCalls, ToolCatalog};
pub use error::{Result, WaypointError};
pub use executor::{ExecutorBuilder, ExecutorConfig, ExecutorState, PlanEvent, PlanExecutor};
pub use generator::PlanGenerator;
pub use models::{
    Action, ActionType, Checkpoint, ImpactAnalysis, Plan, PlanStatus, RiskLevel, Step,
    StepStatus, ToolCallRecord, ToolErrorKind, ToolResult,
};
pub use params::{AuditQuery, CheckpointId, CreatePlan, StepSpec, ToolCall};
pub use store::{BackingStore, LocalStore, MemoryStore, StoreError, StoreErrorKind};
pub use tools::{ToolEngine, ToolEngineBuilder, ToolEngineConfig, ToolName};
