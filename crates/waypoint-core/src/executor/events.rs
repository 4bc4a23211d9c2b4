//! Typed plan events and the subscriber list they are delivered to.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{checkpoint::RollbackReport, models::PlanStatus};

/// A transition observed while a plan runs.
///
/// Events are delivered synchronously, in the order the transitions happen.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanEvent {
    StepStarted {
        plan_id: String,
        step_id: String,
        index: usize,
        name: String,
    },
    CheckpointCreated {
        plan_id: String,
        step_id: String,
        checkpoint_id: String,
        files: usize,
    },
    StepCompleted {
        plan_id: String,
        step_id: String,
        index: usize,
    },
    StepFailed {
        plan_id: String,
        step_id: String,
        index: usize,
        error: String,
    },
    RolledBack {
        plan_id: String,
        report: RollbackReport,
    },
    PlanPaused {
        plan_id: String,
        next_index: usize,
    },
    PlanCompleted {
        plan_id: String,
        steps: usize,
    },
    PlanFailed {
        plan_id: String,
        status: PlanStatus,
        error: String,
    },
}

impl PlanEvent {
    pub fn plan_id(&self) -> &str {
        match self {
            PlanEvent::StepStarted { plan_id, .. }
            | PlanEvent::CheckpointCreated { plan_id, .. }
            | PlanEvent::StepCompleted { plan_id, .. }
            | PlanEvent::StepFailed { plan_id, .. }
            | PlanEvent::RolledBack { plan_id, .. }
            | PlanEvent::PlanPaused { plan_id, .. }
            | PlanEvent::PlanCompleted { plan_id, .. }
            | PlanEvent::PlanFailed { plan_id, .. } => plan_id,
        }
    }
}

/// A plan event subscriber. Subscribers only observe; they get no handle
/// back into the executor.
pub type Listener = Arc<dyn Fn(&PlanEvent) + Send + Sync>;

/// Subscribers of one executor.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Listener>>,
}

impl EventBus {
    pub fn subscribe(&self, listener: Listener) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emit(&self, event: &PlanEvent) {
        // Snapshot so a listener may subscribe without deadlocking
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_every_subscriber_receives_events() {
        let bus = EventBus::default();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(0usize));

        let sink = first.clone();
        bus.subscribe(Arc::new(move |e: &PlanEvent| {
            sink.lock().unwrap().push(e.plan_id().to_string());
        }));
        let counter = second.clone();
        bus.subscribe(Arc::new(move |_: &PlanEvent| {
            *counter.lock().unwrap() += 1;
        }));

        bus.emit(&PlanEvent::PlanCompleted {
            plan_id: "p1".to_string(),
            steps: 2,
        });

        assert_eq!(bus.len(), 2);
        assert_eq!(*first.lock().unwrap(), vec!["p1"]);
        assert_eq!(*second.lock().unwrap(), 1);
    }
}
