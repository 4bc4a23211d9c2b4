//! Parameter structures for waypoint operations
//!
//! This module contains shared parameter structures used across the
//! interfaces (CLI, MCP) without framework-specific derives. The CLI and the
//! MCP server wrap these types to add their own attributes:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! JSON schema derives are only compiled with the `schema` feature, which
//! the CLI enables for `wp plan schema` and the MCP tool descriptions.
//!
//! ```ignore
//! // In the MCP module
//! #[derive(Deserialize, JsonSchema)]
//! #[serde(transparent)]
//! struct McpParams<T>(T);
//!
//! async fn run_plan(Parameters(McpParams(request)): Parameters<McpParams<CreatePlan>>)
//! ```

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Action;

/// Parameters for generating a plan.
///
/// This is also the format of plan files read by `wp plan validate` and
/// `wp plan run`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// Name of the plan (required)
    pub name: String,
    /// Optional detailed description of the plan
    #[serde(default)]
    pub description: Option<String>,
    /// Identifier of the originating request; generated when omitted
    #[serde(default)]
    pub request_id: Option<String>,
    /// Root that relative action paths resolve against
    #[serde(default)]
    pub workspace_root: Option<String>,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

/// One step of a plan request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepSpec {
    /// Optional stable ID so other steps can depend on this one
    #[serde(default)]
    pub id: Option<String>,
    /// Brief name of the step (required)
    pub name: String,
    /// Optional detailed description
    #[serde(default)]
    pub description: Option<String>,
    /// Mutations executed in order
    #[serde(default)]
    pub actions: Vec<Action>,
    /// IDs of steps that must come first
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// Parameters for a single guarded tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ToolCall {
    /// Catalog name of the tool, e.g. `workspace_readFile`
    pub tool: String,
    /// Tool arguments as a JSON object
    #[serde(default)]
    pub args: Value,
}

/// Parameters for operations requiring just a checkpoint ID.
///
/// Used for rollback_checkpoint and confirm_checkpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CheckpointId {
    /// The ID of the checkpoint to operate on
    pub id: String,
}

/// Parameters for reading the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AuditQuery {
    /// Only return the most recent `limit` records
    #[serde(default)]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActionType;

    #[test]
    fn test_create_plan_parses_minimal_file() {
        let json = r#"{
            "name": "Rename helper",
            "steps": [
                {
                    "name": "Move file",
                    "actions": [
                        {"type": "rename", "file_path": "src/a.rs", "new_path": "src/b.rs"}
                    ]
                }
            ]
        }"#;
        let params: CreatePlan = serde_json::from_str(json).expect("Failed to parse plan");

        assert_eq!(params.name, "Rename helper");
        assert!(params.description.is_none());
        assert_eq!(params.steps.len(), 1);
        assert!(params.steps[0].depends_on.is_empty());
        assert_eq!(params.steps[0].actions[0].kind, ActionType::Rename);
    }

    #[test]
    fn test_tool_call_defaults_args_to_null() {
        let params: ToolCall =
            serde_json::from_str(r#"{"tool":"git_status"}"#).expect("Failed to parse call");
        assert_eq!(params.tool, "git_status");
        assert!(params.args.is_null());
    }
}
