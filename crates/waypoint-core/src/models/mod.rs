//! Data models for plans, steps, actions, checkpoints and tool calls.
//!
//! This module contains the core domain models shared by the plan executor
//! and the guarded tool engine. Display implementations for these models are
//! located in [`crate::display::models`] to keep data structures separate
//! from presentation.
//!
//! ## Ownership
//!
//! During a run the plan executor is the only writer of plan, step and
//! checkpoint state. Everything here is plain data: cloning a [`Plan`] gives
//! an independent copy, which is what `execute` works on.
//!
//! # Examples
//!
//! ```rust
//! use waypoint_core::models::{Action, ActionType, Step, StepStatus};
//!
//! let step = Step::new(
//!     0,
//!     "Add module",
//!     vec![
//!         Action::create("src/util.rs", "pub fn helper() {}\n"),
//!         Action::modify("src/lib.rs", "pub mod util;\n"),
//!     ],
//! );
//!
//! assert_eq!(step.status, StepStatus::Pending);
//! assert_eq!(step.files, vec!["src/util.rs", "src/lib.rs"]);
//! assert_eq!(step.actions[0].kind, ActionType::Create);
//! ```

pub mod action;
pub mod checkpoint;
pub mod impact;
pub mod plan;
pub mod status;
pub mod step;
pub mod tool;


pub use action::Action;
pub use checkpoint::{Checkpoint, FileBackup};
pub use impact::ImpactAnalysis;
pub use plan::Plan;
pub use status::{ActionType, PlanStatus, RiskLevel, StepStatus};
pub use step::Step;
pub use tool::{ToolCallRecord, ToolErrorKind, ToolResult};
