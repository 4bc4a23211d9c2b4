//! Builder for creating and configuring ToolEngine instances.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    audit::{AuditLog, TerminalLog, DEFAULT_AUDIT_CAPACITY, DEFAULT_TERMINAL_LINES},
    catalog::ToolName,
    guard::PermissionGuard,
    retry::RetryPolicy,
    services::EditorServices,
    summary::SummaryLimits,
    truncate::DEFAULT_RESULT_BUDGET,
    ConfirmHandler, ToolEngine,
};
use crate::{
    checkpoint::CheckpointStore,
    config::optional_millis,
    error::Result,
    paths,
    store::BackingStore,
};

/// Default bound on a single backing store call made by a tool.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tool engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolEngineConfig {
    /// Root that relative tool paths are joined to
    pub workspace_root: String,
    /// Character budget of a serialized result
    pub result_budget: usize,
    /// Bound on each backing store call; `None` waits indefinitely
    #[serde(with = "optional_millis")]
    pub call_timeout: Option<Duration>,
    pub retry: RetryPolicy,
    pub summary: SummaryLimits,
    pub audit_capacity: usize,
    pub terminal_log_lines: usize,
    /// Extra blocked path patterns (regular expressions)
    pub blocked_paths: Vec<String>,
    /// Extra blocked command patterns (regular expressions)
    pub blocked_commands: Vec<String>,
}

impl Default for ToolEngineConfig {
    fn default() -> Self {
        Self {
            workspace_root: paths::current_dir(),
            result_budget: DEFAULT_RESULT_BUDGET,
            call_timeout: Some(DEFAULT_CALL_TIMEOUT),
            retry: RetryPolicy::default(),
            summary: SummaryLimits::default(),
            audit_capacity: DEFAULT_AUDIT_CAPACITY,
            terminal_log_lines: DEFAULT_TERMINAL_LINES,
            blocked_paths: Vec::new(),
            blocked_commands: Vec::new(),
        }
    }
}

/// Builder for creating and configuring ToolEngine instances.
pub struct ToolEngineBuilder {
    store: Arc<dyn BackingStore>,
    services: Option<Arc<dyn EditorServices>>,
    confirm: Option<ConfirmHandler>,
    config: ToolEngineConfig,
}

impl ToolEngineBuilder {
    /// Creates a new builder over `store`. Without a confirmation handler
    /// every tool that needs confirmation is rejected.
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        Self {
            store,
            services: None,
            confirm: None,
            config: ToolEngineConfig::default(),
        }
    }

    /// Replaces every setting at once.
    pub fn with_config(mut self, config: ToolEngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<String>) -> Self {
        self.config.workspace_root = root.into();
        self
    }

    /// Attaches editor and language-server services.
    pub fn with_services(mut self, services: Arc<dyn EditorServices>) -> Self {
        self.services = Some(services);
        self
    }

    /// Sets the handler asked before tools that require confirmation.
    pub fn with_confirm_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ToolName, &Value) -> bool + Send + Sync + 'static,
    {
        self.confirm = Some(Arc::new(handler));
        self
    }

    /// Approves every confirmation request.
    pub fn auto_approve(self) -> Self {
        self.with_confirm_handler(|_, _| true)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    pub fn with_result_budget(mut self, budget: usize) -> Self {
        self.config.result_budget = budget;
        self
    }

    pub fn with_summary_limits(mut self, limits: SummaryLimits) -> Self {
        self.config.summary = limits;
        self
    }

    pub fn with_audit_capacity(mut self, capacity: usize) -> Self {
        self.config.audit_capacity = capacity;
        self
    }

    /// Adds blocked path patterns on top of the built-in ones.
    pub fn with_blocked_paths<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .blocked_paths
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Adds blocked command patterns on top of the built-in ones.
    pub fn with_blocked_commands<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config
            .blocked_commands
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Builds the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `WaypointError::InvalidInput` if a configured blocked pattern
    /// is not a valid regular expression.
    pub fn build(self) -> Result<ToolEngine> {
        let guard =
            PermissionGuard::new(&self.config.blocked_paths, &self.config.blocked_commands)?;
        Ok(ToolEngine {
            store: self.store,
            services: self.services,
            guard,
            confirm: self.confirm,
            checkpoints: CheckpointStore::new(),
            audit: AuditLog::new(self.config.audit_capacity),
            terminal: TerminalLog::new(self.config.terminal_log_lines),
            config: self.config,
        })
    }
}
