//! Error handling utilities for MCP server

use rmcp::ErrorData;
use waypoint_core::WaypointError;

/// Converts a core error into an MCP error. Problems with the caller's input
/// become `invalid_params`; everything else is internal.
pub fn to_mcp_error(message: &str, error: &WaypointError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        WaypointError::Validation { .. }
        | WaypointError::InvalidInput { .. }
        | WaypointError::CheckpointNotFound { .. } => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}
