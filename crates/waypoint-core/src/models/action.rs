//! Action model definition and related functionality.

use serde::{Deserialize, Serialize};

use super::ActionType;
use crate::error::{Result, WaypointError};

/// One filesystem-level mutation within a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Action {
    /// What the action does
    #[serde(rename = "type")]
    pub kind: ActionType,

    /// Target path, absolute or relative to the workspace root
    pub file_path: String,

    /// Content written by create/modify
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,

    /// Content found before a modify/delete, captured during execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,

    /// Destination of rename/move
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_path: Option<String>,
}

impl Action {
    fn new(kind: ActionType, file_path: impl Into<String>) -> Self {
        Self {
            kind,
            file_path: file_path.into(),
            new_content: None,
            original_content: None,
            new_path: None,
        }
    }

    pub fn create(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            new_content: Some(content.into()),
            ..Self::new(ActionType::Create, file_path)
        }
    }

    pub fn modify(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            new_content: Some(content.into()),
            ..Self::new(ActionType::Modify, file_path)
        }
    }

    pub fn delete(file_path: impl Into<String>) -> Self {
        Self::new(ActionType::Delete, file_path)
    }

    pub fn rename(file_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            new_path: Some(new_path.into()),
            ..Self::new(ActionType::Rename, file_path)
        }
    }

    pub fn move_to(file_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        Self {
            new_path: Some(new_path.into()),
            ..Self::new(ActionType::Move, file_path)
        }
    }

    /// Checks the fields required by the action type.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::InvalidInput` when `file_path` is blank, when
    /// create/modify lacks `new_content`, or rename/move lacks `new_path`.
    pub fn validate(&self) -> Result<()> {
        if self.file_path.trim().is_empty() {
            return Err(WaypointError::invalid_input("file_path").with_reason(format!(
                "{} action has an empty file path",
                self.kind.as_str()
            )));
        }
        if self.kind.needs_content() && self.new_content.is_none() {
            return Err(WaypointError::invalid_input("new_content").with_reason(format!(
                "{} of '{}' requires new_content",
                self.kind.as_str(),
                self.file_path
            )));
        }
        if self.kind.needs_new_path()
            && self.new_path.as_deref().map_or(true, |p| p.trim().is_empty())
        {
            return Err(WaypointError::invalid_input("new_path").with_reason(format!(
                "{} of '{}' requires new_path",
                self.kind.as_str(),
                self.file_path
            )));
        }
        Ok(())
    }

    /// Paths whose pre-action state a checkpoint must capture.
    pub fn touched_paths(&self) -> Vec<&str> {
        let mut paths = vec![self.file_path.as_str()];
        if self.kind.needs_new_path() {
            if let Some(new_path) = self.new_path.as_deref() {
                paths.push(new_path);
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_validate() {
        assert!(Action::create("a.txt", "x").validate().is_ok());
        assert!(Action::modify("a.txt", "").validate().is_ok());
        assert!(Action::delete("a.txt").validate().is_ok());
        assert!(Action::rename("a.txt", "b.txt").validate().is_ok());
        assert!(Action::move_to("a.txt", "dir/a.txt").validate().is_ok());
    }

    #[test]
    fn test_missing_content_is_invalid() {
        let action = Action {
            new_content: None,
            ..Action::create("a.txt", "")
        };
        let err = action.validate().unwrap_err();
        assert!(err.to_string().contains("new_content"));
    }

    #[test]
    fn test_missing_new_path_is_invalid() {
        let action = Action {
            new_path: Some("  ".to_string()),
            ..Action::rename("a.txt", "b.txt")
        };
        assert!(action.validate().is_err());
    }

    #[test]
    fn test_touched_paths_include_destination() {
        assert_eq!(Action::rename("a", "b").touched_paths(), vec!["a", "b"]);
        assert_eq!(Action::delete("a").touched_paths(), vec!["a"]);
    }

    #[test]
    fn test_serde_uses_type_tag() {
        let raw = r#"{"type":"create","file_path":"x.rs","new_content":"fn x() {}"}"#;
        let action: Action = serde_json::from_str(raw).expect("Failed to parse action");
        assert_eq!(action.kind, ActionType::Create);
        assert_eq!(action.new_content.as_deref(), Some("fn x() {}"));
    }
}
