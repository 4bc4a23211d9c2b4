//! Tool call results and audit records.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{StoreError, StoreErrorKind};

/// Why a guarded tool call failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// The tool name is not in the catalog
    UnknownTool,
    /// Missing or malformed arguments
    InvalidArgs,
    /// A path or command matched a blocked pattern
    Blocked,
    /// Confirmation was required and not given
    Rejected,
    /// A command ran but exited unsuccessfully
    CommandFailed,
    /// The backing store or editor services failed
    Backend(StoreErrorKind),
}

/// Outcome of one guarded tool call. Failures are values, never panics.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ToolErrorKind>,

    /// The serialized data was cut to the result budget
    #[serde(default)]
    pub truncated: bool,

    /// Checkpoint protecting the file this call wrote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<String>,

    /// Backend attempts made (0 when rejected before any call)
    #[serde(default)]
    pub attempts: u32,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failure(kind: ToolErrorKind, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            error_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn from_store_error(error: &StoreError) -> Self {
        Self::failure(ToolErrorKind::Backend(error.kind), error.message.clone())
    }

    /// Whether the failure was a permission gate or confirmation rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.error_kind,
            Some(ToolErrorKind::Blocked | ToolErrorKind::Rejected)
        )
    }
}

/// One audited tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub id: String,
    pub tool: String,
    pub args: Value,
    pub result: ToolResult,
    pub duration_ms: u64,
    pub timestamp: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_id: Option<String>,
}
