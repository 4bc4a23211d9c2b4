//! Impact analysis attached to generated plans.

use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// What a plan would do to the workspace if executed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImpactAnalysis {
    /// Distinct paths touched, in first-touch order
    pub files_affected: Vec<String>,
    pub creates: usize,
    pub modifies: usize,
    pub deletes: usize,
    /// Renames and moves
    pub renames: usize,
    pub risk: RiskLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
