//! Result wrapper types for displaying run and rollback outcomes.

use std::fmt;

use crate::{
    checkpoint::RollbackReport,
    models::{Plan, PlanStatus},
};

/// Wrapper for displaying a plan after `execute` returned it.
///
/// Leads with a one-line verdict, then the full plan.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::{
///     display::RunResult,
///     generator::PlanGenerator,
///     models::{Action, PlanStatus},
///     params::{CreatePlan, StepSpec},
/// };
///
/// let mut plan = PlanGenerator::new()
///     .generate(&CreatePlan {
///         name: "Docs".to_string(),
///         steps: vec![StepSpec {
///             name: "Add readme".to_string(),
///             actions: vec![Action::create("README.md", "# Docs\n")],
///             ..Default::default()
///         }],
///         ..Default::default()
///     })
///     .unwrap();
/// plan.status = PlanStatus::Completed;
///
/// let output = RunResult::new(plan).to_string();
/// assert!(output.starts_with("Plan 'Docs' completed"));
/// ```
pub struct RunResult {
    pub plan: Plan,
}

impl RunResult {
    pub fn new(plan: Plan) -> Self {
        Self { plan }
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = &self.plan;
        let (completed, total) = plan.progress();
        match plan.status {
            PlanStatus::Completed => {
                writeln!(f, "Plan '{}' completed: {total} steps applied", plan.name)?
            }
            PlanStatus::Paused => writeln!(
                f,
                "Plan '{}' paused after {completed} of {total} steps",
                plan.name
            )?,
            PlanStatus::RolledBack => writeln!(
                f,
                "Plan '{}' failed and was rolled back; the workspace is restored",
                plan.name
            )?,
            PlanStatus::Failed => writeln!(
                f,
                "Plan '{}' failed; {completed} of {total} steps remain applied",
                plan.name
            )?,
            other => writeln!(f, "Plan '{}' is {other}", plan.name)?,
        }
        writeln!(f)?;
        write!(f, "{plan}")
    }
}

/// Wrapper for displaying a rollback report.
pub struct RollbackResult<'a>(pub &'a RollbackReport);

impl fmt::Display for RollbackResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        if report.undone.is_empty() && report.skipped.is_empty() {
            return writeln!(f, "Nothing to roll back.");
        }

        if report.failures.is_empty() {
            writeln!(f, "Rolled back {} checkpoint(s).", report.undone.len())?;
        } else {
            writeln!(
                f,
                "Rollback incomplete: {} file(s) could not be restored.",
                report.failures.len()
            )?;
        }
        writeln!(f)?;

        for path in &report.restored {
            writeln!(f, "- restored `{path}`")?;
        }
        for path in &report.deleted {
            writeln!(f, "- deleted `{path}`")?;
        }
        for (from, to) in &report.renamed {
            writeln!(f, "- moved `{from}` back to `{to}`")?;
        }
        for skipped in &report.skipped {
            writeln!(f, "- skipped `{skipped}` (no checkpoint)")?;
        }
        for failure in &report.failures {
            writeln!(
                f,
                "- **failed** to {} `{}`: {}",
                failure.operation.as_str(),
                failure.file_path,
                failure.error
            )?;
        }
        Ok(())
    }
}
