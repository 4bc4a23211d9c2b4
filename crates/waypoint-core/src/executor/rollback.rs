//! Reverse-order undo of applied steps.

use log::{info, warn};

use super::{actions::rename_pairs, PlanEvent, PlanExecutor};
use crate::{
    checkpoint::{self, RollbackReport},
    models::{Plan, StepStatus},
};

impl PlanExecutor {
    /// Undoes every `completed` or `failed` step after `target`, newest
    /// first, then sets `current_step_index` to `target`.
    ///
    /// `None` rolls back to before the first step. Completed steps become
    /// `rolled_back`; a failed step keeps its status and error but its files
    /// are restored. A step whose checkpoint was confirmed or never taken is
    /// listed in [`RollbackReport::skipped`] and left untouched.
    ///
    /// Restore failures never stop the walk; they are collected in the
    /// returned report.
    pub async fn rollback_to_step(&self, plan: &mut Plan, target: Option<usize>) -> RollbackReport {
        let mut report = RollbackReport::default();
        let (Some(current), Some(last_step)) =
            (plan.current_step_index, plan.steps.len().checked_sub(1))
        else {
            return report;
        };
        if target.is_some_and(|t| t >= current) {
            return report;
        }
        let root = plan
            .workspace_root
            .clone()
            .unwrap_or_else(|| self.config.workspace_root.clone());
        let stop = target.map_or(0, |t| t + 1);
        let last = current.min(last_step);

        for index in (stop..=last).rev() {
            let step = &mut plan.steps[index];
            if !step.status.is_rollbackable() {
                continue;
            }
            let Some(cp) = self.checkpoints.remove(&step.id) else {
                warn!("No checkpoint for step {}, skipping rollback", step.id);
                report.skipped.push(step.id.clone());
                continue;
            };

            let renames = rename_pairs(&root, &step.actions);
            let step_report =
                checkpoint::restore(self.store.as_ref(), &cp, &renames, self.config.action_timeout)
                    .await;
            report.merge(step_report);

            if step.status == StepStatus::Completed {
                step.status = StepStatus::RolledBack;
            }
            info!("Rolled back step {} ({})", index + 1, step.name);
        }

        plan.current_step_index = target;
        self.record_rollback(&report);
        self.events.emit(&PlanEvent::RolledBack {
            plan_id: plan.id.clone(),
            report: report.clone(),
        });
        report
    }
}
