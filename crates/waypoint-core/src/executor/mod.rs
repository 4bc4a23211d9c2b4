//! Checkpointed, pausable plan execution.
//!
//! The [`PlanExecutor`] drives a [`Plan`](crate::models::Plan) through a
//! [`BackingStore`] one step at a time:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ wait if      │──▶│ checkpoint   │──▶│ apply actions│──▶│ completed    │
//! │ paused       │   │ touched files│   │ in order     │   │ or rollback  │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for configured [`PlanExecutor`] instances
//! - [`events`]: Typed [`PlanEvent`]s and their subscriber list
//! - `run`: The per-step loop behind [`PlanExecutor::execute`]
//! - `actions`: Per-action semantics (create, modify, delete, rename, move)
//! - `rollback`: Reverse-order undo behind [`PlanExecutor::rollback_to_step`]
//!
//! ## Control
//!
//! [`pause`](PlanExecutor::pause), [`resume`](PlanExecutor::resume) and
//! [`stop`](PlanExecutor::stop) flip flags the run loop observes between
//! steps. Share the executor through an `Arc` to call them from another
//! task while `execute` is in flight. An in-flight step is never
//! interrupted.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use waypoint_core::{
//!     executor::ExecutorBuilder,
//!     generator::PlanGenerator,
//!     models::{Action, PlanStatus},
//!     params::{CreatePlan, StepSpec},
//!     store::MemoryStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let executor = ExecutorBuilder::new(store.clone())
//!     .with_workspace_root("/work")
//!     .build();
//!
//! let mut plan = PlanGenerator::new().generate(&CreatePlan {
//!     name: "Add greeting".to_string(),
//!     steps: vec![StepSpec {
//!         name: "Create file".to_string(),
//!         actions: vec![Action::create("hello.txt", "hi\n")],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! })?;
//! PlanGenerator::approve(&mut plan)?;
//!
//! let finished = executor.execute(&plan).await?;
//! assert_eq!(finished.status, PlanStatus::Completed);
//! assert_eq!(store.file("/work/hello.txt").as_deref(), Some("hi\n"));
//! # Ok(())
//! # }
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use log::{debug, info};

use crate::{
    checkpoint::{CheckpointStore, RollbackReport},
    error::{Result, WaypointError},
    models::Checkpoint,
    store::BackingStore,
};

mod actions;
pub mod builder;
pub mod events;
mod rollback;
mod run;


pub use builder::{ExecutorBuilder, ExecutorConfig};
pub use events::{EventBus, Listener, PlanEvent};

/// Whether an executor currently owns a running plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExecutorState {
    #[default]
    Idle,
    Running { plan_id: String },
}

/// Drives one plan at a time through a backing store.
pub struct PlanExecutor {
    pub(crate) store: Arc<dyn BackingStore>,
    pub(crate) config: ExecutorConfig,
    state: Mutex<ExecutorState>,
    paused: AtomicBool,
    stopped: AtomicBool,
    pub(crate) checkpoints: CheckpointStore,
    pub(crate) events: EventBus,
    last_rollback: Mutex<Option<RollbackReport>>,
}

/// Returns the executor to `Idle` however the run ends.
struct RunGuard<'a> {
    executor: &'a PlanExecutor,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.executor.state_guard() = ExecutorState::Idle;
    }
}

impl PlanExecutor {
    pub(crate) fn new(store: Arc<dyn BackingStore>, config: ExecutorConfig) -> Self {
        Self {
            store,
            config,
            state: Mutex::new(ExecutorState::Idle),
            paused: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            checkpoints: CheckpointStore::new(),
            events: EventBus::default(),
            last_rollback: Mutex::new(None),
        }
    }

    fn state_guard(&self) -> MutexGuard<'_, ExecutorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the executor for `plan_id`.
    fn begin(&self, plan_id: &str) -> Result<RunGuard<'_>> {
        let mut state = self.state_guard();
        if let ExecutorState::Running { plan_id: running } = &*state {
            return Err(WaypointError::PlanAlreadyRunning {
                running: running.clone(),
            });
        }
        *state = ExecutorState::Running {
            plan_id: plan_id.to_string(),
        };
        // A pause requested before the run is honored; a stop is not
        self.stopped.store(false, Ordering::SeqCst);
        debug!("Executor claimed by plan {plan_id}");
        Ok(RunGuard { executor: self })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn state(&self) -> ExecutorState {
        self.state_guard().clone()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), ExecutorState::Running { .. })
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Suspends the run before its next step. Stays in effect across runs
    /// until [`resume`](Self::resume).
    pub fn pause(&self) {
        info!("Pause requested");
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        info!("Resume requested");
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Ends the run before its next step, leaving the plan `paused`.
    pub fn stop(&self) {
        info!("Stop requested");
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Adds an observer of plan events.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&PlanEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(Arc::new(listener));
    }

    /// Outstanding step checkpoints, oldest first.
    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        self.checkpoints.list()
    }

    /// Checkpoint held for `step_id`, if not yet discarded.
    pub fn checkpoint(&self, step_id: &str) -> Option<Checkpoint> {
        self.checkpoints.get(step_id)
    }

    /// Accepts the outcome of a step: its checkpoint is discarded and the
    /// step can no longer be rolled back. Returns `false` if there was
    /// nothing to discard.
    pub fn confirm_checkpoint(&self, step_id: &str) -> bool {
        self.checkpoints.confirm(step_id)
    }

    /// Report of the most recent rollback on this executor.
    pub fn last_rollback(&self) -> Option<RollbackReport> {
        self.last_rollback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn record_rollback(&self, report: &RollbackReport) {
        *self
            .last_rollback
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
    }
}

impl std::fmt::Debug for PlanExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanExecutor")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("paused", &self.is_paused())
            .field("checkpoints", &self.checkpoints.len())
            .finish()
    }
}
