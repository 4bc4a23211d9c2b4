//! Plan generation, validation and impact analysis.
//!
//! The generator turns a structured [`CreatePlan`] request into a `draft`
//! [`Plan`]. Validation is structural only: it checks that every step and
//! action carries the fields its type needs and that dependencies name real
//! steps. Nothing here touches the workspace.

use std::collections::{HashMap, HashSet};

use jiff::Timestamp;
use log::debug;

use crate::{
    error::{Result, WaypointError},
    models::{ActionType, ImpactAnalysis, Plan, PlanStatus, RiskLevel, Step},
    params::CreatePlan,
};

/// Above this many affected files a plan is high risk.
const HIGH_RISK_FILES: usize = 10;
/// Above this many affected files a plan is medium risk.
const MEDIUM_RISK_FILES: usize = 3;

/// Builds draft plans from requests.
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator;

impl PlanGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a validated `draft` plan with its impact analysis.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::Validation` listing every structural problem.
    pub fn generate(&self, request: &CreatePlan) -> Result<Plan> {
        let steps = request
            .steps
            .iter()
            .enumerate()
            .map(|(order, spec)| {
                let mut step = Step::new(order as u32, spec.name.clone(), spec.actions.clone());
                if let Some(id) = spec.id.as_deref().filter(|id| !id.trim().is_empty()) {
                    step.id = id.to_string();
                }
                step.description = spec.description.clone();
                step.depends_on = spec.depends_on.clone();
                step
            })
            .collect();

        let mut plan = Plan {
            id: format!("plan-{}", uuid::Uuid::new_v4().simple()),
            request_id: request
                .request_id
                .clone()
                .unwrap_or_else(|| format!("req-{}", uuid::Uuid::new_v4().simple())),
            name: request.name.clone(),
            description: request.description.clone().unwrap_or_default(),
            workspace_root: request.workspace_root.clone(),
            steps,
            status: PlanStatus::Draft,
            current_step_index: None,
            created_at: Timestamp::now(),
            started_at: None,
            completed_at: None,
            impact_analysis: None,
        };

        validate_plan(&plan)?;
        plan.impact_analysis = Some(analyze_impact(&plan));
        debug!(
            "Generated plan {} with {} steps",
            plan.id,
            plan.steps.len()
        );
        Ok(plan)
    }

    /// Moves a reviewed `draft` plan to `ready`.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::InvalidInput` when the plan is not a draft, or
    /// `WaypointError::Validation` when it no longer validates.
    pub fn approve(plan: &mut Plan) -> Result<()> {
        if plan.status != PlanStatus::Draft {
            return Err(WaypointError::invalid_input("status").with_reason(format!(
                "Only draft plans can be approved, plan is {}",
                plan.status.as_str()
            )));
        }
        validate_plan(plan)?;
        plan.status = PlanStatus::Ready;
        Ok(())
    }
}

/// Checks a plan's structure.
///
/// # Errors
///
/// Returns `WaypointError::Validation` with one entry per problem found.
pub fn validate_plan(plan: &Plan) -> Result<()> {
    let mut problems = Vec::new();

    if plan.name.trim().is_empty() {
        problems.push("plan name is empty".to_string());
    }
    if plan.steps.is_empty() {
        problems.push("plan has no steps".to_string());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for (index, step) in plan.steps.iter().enumerate() {
        let label = format!("step {} ('{}')", index + 1, step.name);
        if !seen.insert(step.id.as_str()) {
            problems.push(format!("{label} reuses step id '{}'", step.id));
        }
        if step.name.trim().is_empty() {
            problems.push(format!("step {} has no name", index + 1));
        }
        if step.actions.is_empty() {
            problems.push(format!("{label} has no actions"));
        }
        for (n, action) in step.actions.iter().enumerate() {
            if let Err(e) = action.validate() {
                problems.push(format!("{label} action {}: {e}", n + 1));
            }
        }
        for dep in &step.depends_on {
            match plan.step_index(dep) {
                None => problems.push(format!("{label} depends on unknown step '{dep}'")),
                Some(dep_index) if dep_index >= index => problems.push(format!(
                    "{label} depends on '{dep}' which does not run before it"
                )),
                Some(_) => {}
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(WaypointError::Validation { problems })
    }
}

/// Summarizes what a plan would do to the workspace.
pub fn analyze_impact(plan: &Plan) -> ImpactAnalysis {
    let mut impact = ImpactAnalysis::default();
    let mut touched_by: HashMap<String, Vec<usize>> = HashMap::new();

    for (index, step) in plan.steps.iter().enumerate() {
        for action in &step.actions {
            match action.kind {
                ActionType::Create => impact.creates += 1,
                ActionType::Modify => impact.modifies += 1,
                ActionType::Delete => impact.deletes += 1,
                ActionType::Rename | ActionType::Move => impact.renames += 1,
            }
            for path in action.touched_paths() {
                if !impact.files_affected.iter().any(|p| p == path) {
                    impact.files_affected.push(path.to_string());
                }
                let steps = touched_by.entry(path.to_string()).or_default();
                if !steps.contains(&index) {
                    steps.push(index);
                }
            }
        }
    }

    for path in &impact.files_affected {
        if let Some(steps) = touched_by.get(path).filter(|s| s.len() > 1) {
            let numbers: Vec<String> = steps.iter().map(|i| (i + 1).to_string()).collect();
            impact.warnings.push(format!(
                "{path} is touched by steps {}",
                numbers.join(", ")
            ));
        }
    }
    for step in &plan.steps {
        for dep in &step.depends_on {
            if plan.step_index(dep).is_none() {
                impact
                    .warnings
                    .push(format!("step '{}' depends on unknown step '{dep}'", step.name));
            }
        }
    }

    let files = impact.files_affected.len();
    impact.risk = if impact.deletes > 0 || files > HIGH_RISK_FILES {
        RiskLevel::High
    } else if impact.renames > 0 || files > MEDIUM_RISK_FILES {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };
    impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Action, params::StepSpec};

    fn request(steps: Vec<StepSpec>) -> CreatePlan {
        CreatePlan {
            name: "Refactor".to_string(),
            steps,
            ..Default::default()
        }
    }

    fn step(name: &str, actions: Vec<Action>) -> StepSpec {
        StepSpec {
            name: name.to_string(),
            actions,
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_produces_draft_with_impact() {
        let plan = PlanGenerator::new()
            .generate(&request(vec![
                step("Create", vec![Action::create("a.rs", "")]),
                step("Edit", vec![Action::modify("lib.rs", "mod a;")]),
            ]))
            .expect("Failed to generate plan");

        assert_eq!(plan.status, PlanStatus::Draft);
        assert_eq!(plan.current_step_index, None);
        assert_eq!(plan.steps[1].order, 1);
        assert!(plan.request_id.starts_with("req-"));

        let impact = plan.impact_analysis.expect("impact missing");
        assert_eq!(impact.files_affected, vec!["a.rs", "lib.rs"]);
        assert_eq!((impact.creates, impact.modifies), (1, 1));
        assert_eq!(impact.risk, RiskLevel::Low);
    }

    #[test]
    fn test_generate_rejects_missing_fields() {
        let bad = Action {
            new_content: None,
            ..Action::create("a.rs", "")
        };
        let err = PlanGenerator::new()
            .generate(&request(vec![step("Broken", vec![bad]), step("", vec![])]))
            .unwrap_err();

        match err {
            WaypointError::Validation { problems } => {
                assert!(problems.iter().any(|p| p.contains("new_content")));
                assert!(problems.iter().any(|p| p.contains("step 2 has no name")));
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_plan_is_invalid() {
        let err = PlanGenerator::new().generate(&request(vec![])).unwrap_err();
        assert!(err.to_string().contains("plan has no steps"));
    }

    #[test]
    fn test_dependencies_must_point_backwards() {
        let first = StepSpec {
            id: Some("first".to_string()),
            ..step("First", vec![Action::create("a", "")])
        };
        let second = StepSpec {
            depends_on: vec!["first".to_string()],
            ..step("Second", vec![Action::create("b", "")])
        };
        assert!(PlanGenerator::new()
            .generate(&request(vec![first.clone(), second.clone()]))
            .is_ok());

        let err = PlanGenerator::new()
            .generate(&request(vec![second, first]))
            .unwrap_err();
        assert!(err.to_string().contains("does not run before it"));
    }

    #[test]
    fn test_risk_levels() {
        let plan = |actions: Vec<Action>| Plan {
            steps: vec![Step::new(0, "s", actions)],
            ..PlanGenerator::new()
                .generate(&request(vec![step("x", vec![Action::delete("x")])]))
                .expect("Failed to generate plan")
        };

        assert_eq!(analyze_impact(&plan(vec![Action::delete("a")])).risk, RiskLevel::High);
        assert_eq!(
            analyze_impact(&plan(vec![Action::rename("a", "b")])).risk,
            RiskLevel::Medium
        );
        let many: Vec<Action> = (0..4).map(|i| Action::create(format!("f{i}"), "")).collect();
        assert_eq!(analyze_impact(&plan(many)).risk, RiskLevel::Medium);
        let lots: Vec<Action> = (0..11).map(|i| Action::create(format!("f{i}"), "")).collect();
        assert_eq!(analyze_impact(&plan(lots)).risk, RiskLevel::High);
    }

    #[test]
    fn test_shared_file_warning() {
        let plan = PlanGenerator::new()
            .generate(&request(vec![
                step("One", vec![Action::create("shared.rs", "a")]),
                step("Two", vec![Action::modify("shared.rs", "b")]),
            ]))
            .expect("Failed to generate plan");

        let impact = plan.impact_analysis.expect("impact missing");
        assert_eq!(impact.warnings, vec!["shared.rs is touched by steps 1, 2"]);
    }

    #[test]
    fn test_approve_only_from_draft() {
        let mut plan = PlanGenerator::new()
            .generate(&request(vec![step("One", vec![Action::create("a", "")])]))
            .expect("Failed to generate plan");

        PlanGenerator::approve(&mut plan).expect("Failed to approve");
        assert_eq!(plan.status, PlanStatus::Ready);
        assert!(PlanGenerator::approve(&mut plan).is_err());
    }
}
