//! Command definitions and handlers for the `wp` binary.
//!
//! Subcommand arguments are clap wrappers converted into core parameter
//! types before anything runs, so the core crate stays free of CLI
//! concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Executor / Tool Engine
//! ```
//!
//! Handlers render the markdown `Display` output of core types through the
//! [`TerminalRenderer`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use log::{debug, info, warn};
use serde_json::Value;
use waypoint_core::{
    models::{Plan, PlanStatus},
    params::{CreatePlan, ToolCall},
    paths,
    store::{BackingStore, LocalStore, MemoryStore},
    ExecutorBuilder, PlanEvent, PlanGenerator, RunResult, Settings, ToolCatalog,
    ToolEngineBuilder,
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Plan commands
// ============================================================================

/// A plan request file
#[derive(Args)]
pub struct PlanFileArgs {
    /// Path to a JSON plan request
    #[arg(help = "Path to a JSON plan request (see `wp plan schema`)")]
    pub file: PathBuf,
}

/// Generate, approve and execute a plan
#[derive(Args)]
pub struct RunPlanArgs {
    /// Path to a JSON plan request
    pub file: PathBuf,
    /// Leave applied steps in place when a step fails
    #[arg(long, help = "Leave applied steps in place when a step fails")]
    pub no_rollback: bool,
    /// Skip snapshots before each step; failures cannot be rolled back
    #[arg(long, help = "Skip snapshots before each step")]
    pub no_checkpoint: bool,
    /// Pause between steps, in milliseconds
    #[arg(long, value_name = "MS")]
    pub step_delay_ms: Option<u64>,
    /// Run against an in-memory copy of the touched files
    #[arg(long, help = "Run against an in-memory copy of the touched files")]
    pub dry_run: bool,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Validate a plan file and show its impact
    #[command(alias = "v")]
    Validate(PlanFileArgs),
    /// Execute a plan file
    #[command(alias = "r")]
    Run(RunPlanArgs),
    /// Print the JSON schema of plan files
    Schema,
}

// ============================================================================
// Tool commands
// ============================================================================

/// Make a single guarded tool call
#[derive(Args)]
pub struct CallToolArgs {
    /// Catalog name of the tool, e.g. workspace_readFile
    pub name: String,
    /// Tool arguments as a JSON object
    #[arg(long, value_name = "JSON")]
    pub args: Option<String>,
    /// Approve tools that require confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl TryFrom<&CallToolArgs> for ToolCall {
    type Error = anyhow::Error;

    fn try_from(val: &CallToolArgs) -> Result<Self> {
        let args = match val.args.as_deref() {
            Some(raw) => serde_json::from_str(raw).context("--args is not valid JSON")?,
            None => Value::Null,
        };
        Ok(ToolCall {
            tool: val.name.clone(),
            args,
        })
    }
}

#[derive(Subcommand)]
pub enum ToolCommands {
    /// List the tool catalog with permissions
    #[command(alias = "ls")]
    List,
    /// Call a tool
    Call(CallToolArgs),
}

/// Options for the MCP server
#[derive(Args)]
pub struct ServeArgs {
    /// Approve every tool that requires confirmation
    #[arg(long)]
    pub auto_approve: bool,
}

// ============================================================================
// Handlers
// ============================================================================

pub struct Cli {
    settings: Settings,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(settings: Settings, renderer: TerminalRenderer) -> Self {
        Self { settings, renderer }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Validate(args) => self.validate_plan(&args).await,
            PlanCommands::Run(args) => self.run_plan(&args).await,
            PlanCommands::Schema => print_plan_schema(),
        }
    }

    pub async fn handle_tool_command(&self, command: ToolCommands) -> Result<()> {
        match command {
            ToolCommands::List => self.renderer.render(&ToolCatalog.to_string()),
            ToolCommands::Call(args) => self.call_tool(&args).await,
        }
    }

    async fn validate_plan(&self, args: &PlanFileArgs) -> Result<()> {
        let request = read_plan_request(&args.file).await?;
        let plan = PlanGenerator::new()
            .generate(&request)
            .context("Plan is invalid")?;
        self.renderer.render(&plan.to_string())
    }

    async fn run_plan(&self, args: &RunPlanArgs) -> Result<()> {
        let request = read_plan_request(&args.file).await?;
        let mut plan = PlanGenerator::new()
            .generate(&request)
            .context("Plan is invalid")?;
        PlanGenerator::approve(&mut plan)?;

        let store: Arc<dyn BackingStore> = if args.dry_run {
            Arc::new(self.dry_run_store(&plan).await)
        } else {
            Arc::new(LocalStore::new())
        };

        let mut builder = ExecutorBuilder::new(store)
            .with_config(self.settings.executor.clone())
            .with_auto_rollback(!args.no_rollback)
            .with_auto_checkpoint(!args.no_checkpoint);
        if let Some(ms) = args.step_delay_ms {
            builder = builder.with_step_delay(Some(Duration::from_millis(ms)));
        }
        let executor = Arc::new(builder.build());
        executor.subscribe(|event| println!("{}", describe_event(event)));

        // Ctrl-C stops the run at the next step boundary
        let interrupt = {
            let executor = executor.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping after the current step");
                    executor.stop();
                }
            })
        };

        info!("Running plan {} ({} steps)", plan.id, plan.steps.len());
        let result = executor.execute(&plan).await;
        interrupt.abort();
        let finished = result.context("Failed to run plan")?;
        let status = finished.status;

        println!();
        self.renderer.render(&RunResult::new(finished).to_string())?;
        if args.dry_run {
            println!("\nDry run: no files were changed.");
        }

        match status {
            PlanStatus::Completed | PlanStatus::Paused => Ok(()),
            other => bail!("Plan ended {other}"),
        }
    }

    /// An in-memory store seeded with the current content of every path the
    /// plan touches.
    async fn dry_run_store(&self, plan: &Plan) -> MemoryStore {
        let root = plan
            .workspace_root
            .as_deref()
            .unwrap_or(&self.settings.executor.workspace_root);
        let store = MemoryStore::new();
        for action in plan.steps.iter().flat_map(|s| &s.actions) {
            for path in action.touched_paths() {
                let resolved = paths::resolve(root, path);
                if let Ok(content) = tokio::fs::read_to_string(&resolved).await {
                    store.insert(resolved, content);
                }
            }
        }
        debug!("Dry run seeded {} files", store.files().len());
        store
    }

    async fn call_tool(&self, args: &CallToolArgs) -> Result<()> {
        let call = ToolCall::try_from(args)?;
        let mut builder = ToolEngineBuilder::new(Arc::new(LocalStore::new()))
            .with_config(self.settings.tools.clone());
        if args.yes {
            builder = builder.auto_approve();
        }
        let engine = builder.build().context("Failed to initialize tool engine")?;

        let result = engine.execute(&call.tool, call.args).await;
        self.renderer.render(&result.to_string())?;
        if !result.success {
            bail!("{} failed", call.tool);
        }
        Ok(())
    }
}

async fn read_plan_request(path: &Path) -> Result<CreatePlan> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse plan file {}", path.display()))
}

fn print_plan_schema() -> Result<()> {
    let schema = schemars::schema_for!(CreatePlan);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// One progress line per executor event.
fn describe_event(event: &PlanEvent) -> String {
    match event {
        PlanEvent::StepStarted { index, name, .. } => format!("▶ step {}: {name}", index + 1),
        PlanEvent::CheckpointCreated {
            checkpoint_id,
            files,
            ..
        } => format!("  checkpoint {checkpoint_id} ({files} files)"),
        PlanEvent::StepCompleted { index, .. } => format!("✓ step {}", index + 1),
        PlanEvent::StepFailed { index, error, .. } => {
            format!("✗ step {}: {error}", index + 1)
        }
        PlanEvent::RolledBack { report, .. } => format!(
            "↺ rolled back {} steps, {} failures",
            report.undone.len(),
            report.failures.len()
        ),
        PlanEvent::PlanPaused { next_index, .. } => {
            format!("⏸ paused before step {}", next_index + 1)
        }
        PlanEvent::PlanCompleted { steps, .. } => format!("✓ plan completed ({steps} steps)"),
        PlanEvent::PlanFailed { status, error, .. } => format!("✗ plan {status}: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use waypoint_core::RollbackReport;

    use super::*;

    #[test]
    fn test_call_args_parse_json() {
        let args = CallToolArgs {
            name: "workspace_readFile".to_string(),
            args: Some(r#"{"path":"a.txt"}"#.to_string()),
            yes: false,
        };
        let call = ToolCall::try_from(&args).expect("args should parse");
        assert_eq!(call.args["path"], "a.txt");

        let missing = CallToolArgs { args: None, ..args };
        assert!(ToolCall::try_from(&missing)
            .expect("no args is fine")
            .args
            .is_null());
    }

    #[test]
    fn test_call_args_reject_bad_json() {
        let args = CallToolArgs {
            name: "git_status".to_string(),
            args: Some("{oops".to_string()),
            yes: false,
        };
        assert!(ToolCall::try_from(&args).is_err());
    }

    #[test]
    fn test_describe_event() {
        let started = PlanEvent::StepStarted {
            plan_id: "plan-1".to_string(),
            step_id: "s1".to_string(),
            index: 0,
            name: "Edit".to_string(),
        };
        assert_eq!(describe_event(&started), "▶ step 1: Edit");

        let rolled_back = PlanEvent::RolledBack {
            plan_id: "plan-1".to_string(),
            report: RollbackReport {
                undone: vec!["s2".to_string(), "s1".to_string()],
                ..RollbackReport::default()
            },
        };
        assert_eq!(
            describe_event(&rolled_back),
            "↺ rolled back 2 steps, 0 failures"
        );
    }
}
