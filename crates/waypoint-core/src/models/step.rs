//! Step model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Action, Checkpoint, StepStatus};

/// One atomic, independently checkpointed unit of work within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique identifier for the step
    pub id: String,

    /// Order of the step within the plan (0-indexed)
    pub order: u32,

    /// Brief name of the step
    pub name: String,

    /// Detailed description of the step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Paths the step touches (informational)
    #[serde(default)]
    pub files: Vec<String>,

    /// Mutations executed in order
    pub actions: Vec<Action>,

    /// IDs of steps that must complete before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Current status of the step
    #[serde(default)]
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Failure message when status = Failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Snapshot taken before the first action ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint: Option<Checkpoint>,
}

impl Step {
    /// Creates a pending step.
    pub fn new(order: u32, name: impl Into<String>, actions: Vec<Action>) -> Self {
        let files = actions.iter().map(|a| a.file_path.clone()).collect();
        Self {
            id: format!("step-{}", uuid::Uuid::new_v4().simple()),
            order,
            name: name.into(),
            description: None,
            files,
            actions,
            depends_on: Vec::new(),
            status: StepStatus::Pending,
            started_at: None,
            completed_at: None,
            error: None,
            checkpoint: None,
        }
    }
}
