#![allow(dead_code)]

use std::sync::Arc;

use waypoint_core::{
    models::{Action, Plan},
    params::{CreatePlan, StepSpec},
    store::MemoryStore,
    tools::{RetryPolicy, ToolEngine, ToolEngineBuilder},
    ExecutorBuilder, PlanExecutor, PlanGenerator,
};

pub const ROOT: &str = "/work";

/// Helper function to create an executor over a memory store rooted at ROOT
pub fn create_test_executor(store: &Arc<MemoryStore>) -> PlanExecutor {
    ExecutorBuilder::new(store.clone())
        .with_workspace_root(ROOT)
        .with_action_timeout(None)
        .build()
}

/// Helper function to create an auto-approving tool engine rooted at ROOT
pub fn create_test_engine(store: &Arc<MemoryStore>) -> ToolEngine {
    ToolEngineBuilder::new(store.clone())
        .with_workspace_root(ROOT)
        .with_retry(RetryPolicy::none())
        .auto_approve()
        .build()
        .expect("Failed to build tool engine")
}

/// Helper function to generate and approve a plan from `(name, actions)` pairs
pub fn approved_plan(name: &str, steps: Vec<(&str, Vec<Action>)>) -> Plan {
    let mut plan = PlanGenerator::new()
        .generate(&CreatePlan {
            name: name.to_string(),
            steps: steps
                .into_iter()
                .map(|(name, actions)| StepSpec {
                    name: name.to_string(),
                    actions,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })
        .expect("Failed to generate plan");
    PlanGenerator::approve(&mut plan).expect("Failed to approve plan");
    plan
}

pub fn path(relative: &str) -> String {
    format!("{ROOT}/{relative}")
}
