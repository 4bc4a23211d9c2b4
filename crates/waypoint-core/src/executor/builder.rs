//! Builder for creating and configuring PlanExecutor instances.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use super::PlanExecutor;
use crate::{
    config::{millis, optional_millis},
    paths,
    store::BackingStore,
};

/// Default bound on a single backing store call made by the executor.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Interval at which a paused run checks whether it was resumed.
pub const DEFAULT_PAUSE_POLL: Duration = Duration::from_millis(100);

/// Executor settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Root that relative action paths are joined to
    pub workspace_root: String,
    /// Snapshot touched files before each step
    pub auto_checkpoint: bool,
    /// Undo applied steps when a step fails
    pub auto_rollback: bool,
    /// Throttle between steps
    #[serde(with = "optional_millis")]
    pub step_delay: Option<Duration>,
    /// Bound on each backing store call; `None` waits indefinitely
    #[serde(with = "optional_millis")]
    pub action_timeout: Option<Duration>,
    #[serde(with = "millis")]
    pub pause_poll_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workspace_root: paths::current_dir(),
            auto_checkpoint: true,
            auto_rollback: true,
            step_delay: None,
            action_timeout: Some(DEFAULT_ACTION_TIMEOUT),
            pause_poll_interval: DEFAULT_PAUSE_POLL,
        }
    }
}

/// Builder for creating and configuring PlanExecutor instances.
pub struct ExecutorBuilder {
    store: Arc<dyn BackingStore>,
    config: ExecutorConfig,
}

impl ExecutorBuilder {
    /// Creates a new builder over `store` with default settings.
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            config: ExecutorConfig::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the root relative action paths resolve against.
    ///
    /// Defaults to the current working directory. A plan's own
    /// `workspace_root` takes precedence.
    pub fn with_workspace_root(mut self, root: impl Into<String>) -> Self {
        self.config.workspace_root = root.into();
        self
    }

    pub fn with_auto_checkpoint(mut self, enabled: bool) -> Self {
        self.config.auto_checkpoint = enabled;
        self
    }

    pub fn with_auto_rollback(mut self, enabled: bool) -> Self {
        self.config.auto_rollback = enabled;
        self
    }

    pub fn with_step_delay(mut self, delay: Option<Duration>) -> Self {
        self.config.step_delay = delay;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.action_timeout = timeout;
        self
    }

    pub fn with_pause_poll_interval(mut self, interval: Duration) -> Self {
        self.config.pause_poll_interval = interval;
        self
    }

    /// Builds the configured executor.
    pub fn build(self) -> PlanExecutor {
        PlanExecutor::new(self.store, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_builder_applies_settings() {
        let executor = ExecutorBuilder::new(Arc::new(MemoryStore::new()))
            .with_workspace_root("/repo")
            .with_auto_rollback(false)
            .with_step_delay(Some(Duration::from_millis(5)))
            .with_action_timeout(None)
            .build();

        let config = executor.config();
        assert_eq!(config.workspace_root, "/repo");
        assert!(config.auto_checkpoint);
        assert!(!config.auto_rollback);
        assert_eq!(config.step_delay, Some(Duration::from_millis(5)));
        assert_eq!(config.action_timeout, None);
    }

    #[test]
    fn test_config_serializes_durations_as_millis() {
        let config = ExecutorConfig {
            workspace_root: "/w".to_string(),
            step_delay: Some(Duration::from_millis(250)),
            ..ExecutorConfig::default()
        };
        let json = serde_json::to_value(&config).expect("Failed to serialize");
        assert_eq!(json["step_delay"], 250);
        assert_eq!(json["action_timeout"], 60_000);

        let parsed: ExecutorConfig =
            serde_json::from_str(r#"{"auto_rollback": false, "action_timeout": null}"#)
                .expect("Failed to parse");
        assert!(!parsed.auto_rollback);
        assert!(parsed.auto_checkpoint);
        assert_eq!(parsed.action_timeout, None);
    }
}
