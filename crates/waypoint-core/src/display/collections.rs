//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use super::datetime::LocalDateTime;
use crate::{
    models::{Checkpoint, Step, ToolCallRecord},
    tools::ToolName,
};

/// Newtype wrapper for displaying collections of steps.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::{
///     display::Steps,
///     models::{Action, Step},
/// };
///
/// let steps = Steps(vec![Step::new(0, "Add readme", vec![Action::create("README.md", "")])]);
/// assert!(steps.to_string().contains("### 1. Add readme"));
/// assert_eq!(Steps(vec![]).to_string(), "No steps found.\n");
/// ```
pub struct Steps(pub Vec<Step>);

impl Steps {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.0.iter()
    }
}

impl Index<usize> for Steps {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<'a> IntoIterator for &'a Steps {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Steps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No steps found.");
        }
        for step in &self.0 {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying outstanding checkpoints.
pub struct Checkpoints(pub Vec<Checkpoint>);

impl fmt::Display for Checkpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No outstanding checkpoints.");
        }
        for checkpoint in &self.0 {
            write!(f, "{checkpoint}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying audited tool calls as a table.
pub struct ToolCalls(pub Vec<ToolCallRecord>);

impl fmt::Display for ToolCalls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No tool calls recorded.");
        }
        writeln!(f, "| Time | Tool | Result | Attempts | Duration |")?;
        writeln!(f, "|---|---|---|---|---|")?;
        for record in &self.0 {
            let outcome = match (record.result.success, record.result.error_kind) {
                (true, _) => "✓".to_string(),
                (false, Some(kind)) => format!("✗ {kind}"),
                (false, None) => "✗".to_string(),
            };
            writeln!(
                f,
                "| {} | {} | {outcome} | {} | {}ms |",
                LocalDateTime(&record.timestamp),
                record.tool,
                record.result.attempts,
                record.duration_ms
            )?;
        }
        Ok(())
    }
}

/// The tool catalog with each tool's permission level and risk.
pub struct ToolCatalog;

impl fmt::Display for ToolCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| Tool | Permission | Risk | Confirm | Description |")?;
        writeln!(f, "|---|---|---|---|---|")?;
        for tool in ToolName::ALL {
            let permission = tool.permission();
            writeln!(
                f,
                "| {tool} | {} | {} | {} | {} |",
                permission.level.as_str(),
                permission.risk.as_str(),
                if permission.require_confirmation { "yes" } else { "no" },
                tool.description()
            )?;
        }
        Ok(())
    }
}
