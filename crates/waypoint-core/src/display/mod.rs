//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! this module adds wrappers for collections and for the outcome of runs and
//! rollbacks. Everything renders as markdown, which the CLI hands to its
//! terminal renderer and the MCP server returns as text.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers        │    │   Formatted     │
//! │ (Plan, Step,    │───▶│ (RunResult,     │───▶│    Output       │
//! │  ToolResult)    │    │  ToolCalls, …)  │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Steps, Checkpoints, ToolCalls, ToolCatalog
//! - [`results`]: RunResult, RollbackResult
//! - [`status`]: OperationStatus
//! - [`datetime`]: LocalDateTime, Elapsed
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use waypoint_core::{
//!     checkpoint::RollbackReport,
//!     display::{OperationStatus, RollbackResult},
//! };
//!
//! let report = RollbackReport {
//!     undone: vec!["cp-1".to_string()],
//!     restored: vec!["/work/src/lib.rs".to_string()],
//!     ..RollbackReport::default()
//! };
//! let output = RollbackResult(&report).to_string();
//! assert!(output.contains("restored `/work/src/lib.rs`"));
//!
//! let status = OperationStatus::success("Checkpoint cp-1 confirmed");
//! assert_eq!(status.to_string(), "Success: Checkpoint cp-1 confirmed\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Checkpoints, Steps, ToolCalls, ToolCatalog};
pub use datetime::{Elapsed, LocalDateTime};
pub use results::{RollbackResult, RunResult};
pub use status::OperationStatus;
