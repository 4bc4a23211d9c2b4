//! The step loop behind `execute`.

use jiff::Timestamp;
use log::{debug, info, warn};

use super::{actions::checkpoint_paths, PlanEvent, PlanExecutor};
use crate::{
    checkpoint,
    error::{Result, WaypointError},
    generator,
    models::{Plan, PlanStatus, StepStatus},
};

/// How a single step ended.
enum StepOutcome {
    Completed,
    Failed(String),
}

impl PlanExecutor {
    /// Executes `plan` and returns the updated copy.
    ///
    /// A plan that ends `completed`, `failed`, `rolled_back` or `paused` is
    /// returned as `Ok`; step failures are recorded on the plan rather than
    /// raised. Calling `execute` again with a `paused` plan resumes at its
    /// first step that is not `completed`.
    ///
    /// # Errors
    ///
    /// - `WaypointError::PlanAlreadyRunning` if this executor is busy
    /// - `WaypointError::Validation` if the plan is structurally invalid
    /// - `WaypointError::InvalidInput` if the plan is already terminal
    pub async fn execute(&self, plan: &Plan) -> Result<Plan> {
        let _guard = self.begin(&plan.id)?;

        if !plan.status.is_executable() {
            return Err(WaypointError::invalid_input("status").with_reason(format!(
                "Plan is {} and cannot be executed",
                plan.status.as_str()
            )));
        }
        generator::validate_plan(plan)?;

        let mut plan = plan.clone();
        let root = plan
            .workspace_root
            .clone()
            .unwrap_or_else(|| self.config.workspace_root.clone());
        let resuming = plan.status == PlanStatus::Paused;

        plan.status = PlanStatus::Running;
        if plan.started_at.is_none() {
            plan.started_at = Some(Timestamp::now());
        }
        info!(
            "{} plan {} ({} steps)",
            if resuming { "Resuming" } else { "Executing" },
            plan.id,
            plan.steps.len()
        );

        let mut first = true;
        for index in 0..plan.steps.len() {
            if plan.steps[index].status == StepStatus::Completed {
                continue;
            }

            if !first {
                if let Some(delay) = self.config.step_delay {
                    tokio::time::sleep(delay).await;
                }
            }
            first = false;

            if !self.wait_while_paused().await {
                plan.status = PlanStatus::Paused;
                info!("Plan {} paused before step {}", plan.id, index + 1);
                self.events.emit(&PlanEvent::PlanPaused {
                    plan_id: plan.id.clone(),
                    next_index: index,
                });
                return Ok(plan);
            }

            match self.run_step(&mut plan, &root, index).await {
                StepOutcome::Completed => {}
                StepOutcome::Failed(error) => {
                    self.finish_failed(&mut plan, error).await;
                    return Ok(plan);
                }
            }
        }

        if plan.all_steps_completed() {
            plan.status = PlanStatus::Completed;
            plan.completed_at = Some(Timestamp::now());
            self.checkpoints.clear();
            info!("Plan {} completed", plan.id);
            self.events.emit(&PlanEvent::PlanCompleted {
                plan_id: plan.id.clone(),
                steps: plan.steps.len(),
            });
        }
        Ok(plan)
    }

    /// Blocks while paused. Returns `false` if the run was stopped.
    async fn wait_while_paused(&self) -> bool {
        loop {
            if self.is_stopped() {
                return false;
            }
            if !self.is_paused() {
                return true;
            }
            tokio::time::sleep(self.config.pause_poll_interval).await;
        }
    }

    async fn run_step(&self, plan: &mut Plan, root: &str, index: usize) -> StepOutcome {
        plan.current_step_index = Some(index);
        let plan_id = plan.id.clone();
        let step = &mut plan.steps[index];

        step.status = StepStatus::Running;
        step.started_at = Some(Timestamp::now());
        step.completed_at = None;
        step.error = None;
        info!("Step {} started: {}", index + 1, step.name);
        self.events.emit(&PlanEvent::StepStarted {
            plan_id: plan_id.clone(),
            step_id: step.id.clone(),
            index,
            name: step.name.clone(),
        });

        if self.config.auto_checkpoint {
            let cp = checkpoint::capture(
                self.store.as_ref(),
                &step.id,
                checkpoint_paths(root, &step.actions),
                self.config.action_timeout,
            )
            .await;
            self.events.emit(&PlanEvent::CheckpointCreated {
                plan_id: plan_id.clone(),
                step_id: step.id.clone(),
                checkpoint_id: cp.id.clone(),
                files: cp.backups.len(),
            });
            self.checkpoints.insert(step.id.clone(), cp.clone());
            step.checkpoint = Some(cp);
        }

        for action in step.actions.iter_mut() {
            if let Err(e) = self.apply_action(root, action).await {
                let message = e.to_string();
                warn!("Step {} failed: {message}", index + 1);
                step.status = StepStatus::Failed;
                step.error = Some(message.clone());
                self.events.emit(&PlanEvent::StepFailed {
                    plan_id,
                    step_id: step.id.clone(),
                    index,
                    error: message.clone(),
                });
                return StepOutcome::Failed(message);
            }
        }

        step.status = StepStatus::Completed;
        step.completed_at = Some(Timestamp::now());
        debug!("Step {} completed", index + 1);
        self.events.emit(&PlanEvent::StepCompleted {
            plan_id,
            step_id: step.id.clone(),
            index,
        });
        StepOutcome::Completed
    }

    async fn finish_failed(&self, plan: &mut Plan, error: String) {
        if self.config.auto_rollback {
            let report = self.rollback_to_step(plan, None).await;
            plan.status = PlanStatus::RolledBack;
            if !report.is_complete() {
                warn!(
                    "Plan {} rolled back with problems: {}",
                    plan.id,
                    report.failed_paths().join(", ")
                );
            }
        } else {
            plan.status = PlanStatus::Failed;
        }
        plan.completed_at = Some(Timestamp::now());
        self.checkpoints.clear();
        info!("Plan {} ended {}", plan.id, plan.status.as_str());
        self.events.emit(&PlanEvent::PlanFailed {
            plan_id: plan.id.clone(),
            status: plan.status,
            error,
        });
    }
}
