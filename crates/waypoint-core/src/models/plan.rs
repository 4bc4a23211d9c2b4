//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{ImpactAnalysis, PlanStatus, Step, StepStatus};

/// Represents a multi-file change as an ordered list of steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: String,

    /// Identifier of the request the plan was generated for
    pub request_id: String,

    /// Name of the plan
    pub name: String,

    /// Detailed description of the plan
    #[serde(default)]
    pub description: String,

    /// Root relative action paths resolve against; the executor's root when
    /// unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<String>,

    /// Steps executed in array order
    pub steps: Vec<Step>,

    /// Lifecycle status
    #[serde(default)]
    pub status: PlanStatus,

    /// Step currently executing or most recently attempted; `None` before
    /// the first step starts
    #[serde(default)]
    pub current_step_index: Option<usize>,

    /// Timestamp when the plan was created (UTC)
    pub created_at: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,

    /// Impact summary computed by the generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_analysis: Option<ImpactAnalysis>,
}

impl Plan {
    /// Number of completed steps and total steps.
    pub fn progress(&self) -> (usize, usize) {
        let completed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count();
        (completed, self.steps.len())
    }

    /// Index of the step with `step_id`.
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    pub fn all_steps_completed(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }
}
