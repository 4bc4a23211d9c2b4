//! Display implementations for domain models.
//!
//! Plans and steps render as markdown for the terminal renderer; statuses
//! and small value types render as their plain names.

use std::fmt;

use super::datetime::{Elapsed, LocalDateTime};
use crate::models::{
    Action, ActionType, Checkpoint, ImpactAnalysis, Plan, PlanStatus, RiskLevel, Step,
    StepStatus, ToolErrorKind, ToolResult,
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolErrorKind::UnknownTool => f.write_str("unknown_tool"),
            ToolErrorKind::InvalidArgs => f.write_str("invalid_args"),
            ToolErrorKind::Blocked => f.write_str("blocked"),
            ToolErrorKind::Rejected => f.write_str("rejected"),
            ToolErrorKind::CommandFailed => f.write_str("command_failed"),
            ToolErrorKind::Backend(kind) => write!(f, "backend:{kind}"),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.kind, self.file_path)?;
        if let Some(new_path) = &self.new_path {
            write!(f, " → `{new_path}`")?;
        }
        if let Some(content) = &self.new_content {
            write!(f, " ({} bytes)", content.len())?;
        }
        Ok(())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (completed, total) = self.progress();
        writeln!(f, "# {} ({completed}/{total})", self.name)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Status: {}", self.status)?;
        if let Some(root) = &self.workspace_root {
            writeln!(f, "- Workspace: {root}")?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        if let Some(started) = &self.started_at {
            writeln!(
                f,
                "- Duration: {}",
                Elapsed::between(started, self.completed_at.as_ref())
            )?;
        }

        if !self.description.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.description)?;
        }

        if let Some(impact) = &self.impact_analysis {
            writeln!(f)?;
            write!(f, "{impact}")?;
        }

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps in this plan.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in &self.steps {
                write!(f, "{step}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.order + 1,
            self.name,
            self.status.with_icon()
        )?;
        writeln!(f)?;

        if let Some(desc) = &self.description {
            writeln!(f, "{desc}")?;
            writeln!(f)?;
        }

        for action in &self.actions {
            writeln!(f, "- {action}")?;
        }
        if !self.depends_on.is_empty() {
            writeln!(f, "- Depends on: {}", self.depends_on.join(", "))?;
        }
        writeln!(f)?;

        if self.status == StepStatus::Failed {
            if let Some(error) = &self.error {
                writeln!(f, "> **Error**: {error}")?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ImpactAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Impact ({} risk)", self.risk)?;
        writeln!(f)?;
        writeln!(
            f,
            "{} files: {} created, {} modified, {} deleted, {} renamed",
            self.files_affected.len(),
            self.creates,
            self.modifies,
            self.deletes,
            self.renames
        )?;
        for warning in &self.warnings {
            writeln!(f, "- ⚠ {warning}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- **{}** for `{}` at {} ({} files, {} new)",
            self.id,
            self.step_id,
            LocalDateTime(&self.created_at),
            self.backups.len(),
            self.absent_count()
        )
    }
}

impl fmt::Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            writeln!(f, "✓ Succeeded after {} attempt(s)", self.attempts)?;
        } else {
            let kind = self
                .error_kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "error".to_string());
            writeln!(
                f,
                "✗ Failed ({kind}): {}",
                self.error.as_deref().unwrap_or("no message")
            )?;
        }
        if let Some(id) = &self.checkpoint_id {
            writeln!(f, "Checkpoint: {id}")?;
        }
        if self.truncated {
            writeln!(f, "Output was truncated.")?;
        }
        if let Some(data) = &self.data {
            writeln!(f)?;
            match data {
                serde_json::Value::String(text) => writeln!(f, "```\n{text}\n```")?,
                other => writeln!(
                    f,
                    "```json\n{}\n```",
                    serde_json::to_string_pretty(other).map_err(|_| fmt::Error)?
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use serde_json::json;

    use super::*;

    fn sample_plan() -> Plan {
        let mut failing = Step::new(1, "Wire it up", vec![Action::modify("src/lib.rs", "mod a;")]);
        failing.status = StepStatus::Failed;
        failing.error = Some("write failed: permission denied".to_string());
        Plan {
            id: "plan-1".to_string(),
            request_id: "req-1".to_string(),
            name: "Add module".to_string(),
            description: "Adds a module".to_string(),
            workspace_root: Some("/w".to_string()),
            steps: vec![
                Step::new(0, "Create file", vec![Action::create("src/a.rs", "fn a() {}")]),
                failing,
            ],
            status: PlanStatus::Failed,
            current_step_index: Some(1),
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
            impact_analysis: None,
        }
    }

    #[test]
    fn test_plan_display() {
        let output = sample_plan().to_string();
        assert!(output.starts_with("# Add module (0/2)"));
        assert!(output.contains("- Status: failed"));
        assert!(output.contains("### 1. Create file (○ Pending)"));
        assert!(output.contains("- create `src/a.rs` (9 bytes)"));
        assert!(output.contains("### 2. Wire it up (✗ Failed)"));
        assert!(output.contains("> **Error**: write failed: permission denied"));
    }

    #[test]
    fn test_rename_action_display() {
        let action = Action::rename("old.rs", "new.rs");
        assert_eq!(action.to_string(), "rename `old.rs` → `new.rs`");
    }

    #[test]
    fn test_tool_result_display() {
        let ok = ToolResult {
            checkpoint_id: Some("cp-1".to_string()),
            attempts: 1,
            ..ToolResult::ok(json!({"bytesWritten": 3}))
        };
        let output = ok.to_string();
        assert!(output.contains("✓ Succeeded after 1 attempt(s)"));
        assert!(output.contains("Checkpoint: cp-1"));
        assert!(output.contains("\"bytesWritten\": 3"));

        let blocked = ToolResult::failure(ToolErrorKind::Blocked, "Access to '.env' is blocked");
        assert!(blocked
            .to_string()
            .contains("✗ Failed (blocked): Access to '.env' is blocked"));
    }
}
