//! MCP tool handlers implementation

use std::sync::Arc;

use log::debug;
use rmcp::{
    handler::server::tool::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::Deserialize;
use waypoint_core::{
    display::{OperationStatus, RollbackResult, RunResult, ToolCalls, ToolCatalog},
    params as core, PlanExecutor, PlanGenerator, ToolEngine,
};

use super::errors::to_mcp_error;

/// Generic MCP wrapper for core parameter types
///
/// Passes deserialization and schema generation straight through to the
/// wrapped type, so core parameters need no MCP-specific derives.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type ToolCall = McpParams<core::ToolCall>;
pub type CheckpointId = McpParams<core::CheckpointId>;
pub type AuditQuery = McpParams<core::AuditQuery>;
pub type CreatePlan = McpParams<core::CreatePlan>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl ToString) -> Vec<Content> {
    vec![Content::text(output.to_string())]
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    executor: Arc<PlanExecutor>,
    engine: Arc<ToolEngine>,
}

impl McpHandlers {
    pub fn new(executor: Arc<PlanExecutor>, engine: Arc<ToolEngine>) -> Self {
        Self { executor, engine }
    }

    pub async fn execute_tool(&self, Parameters(params): Parameters<ToolCall>) -> McpResult {
        debug!("execute_tool: {:?}", params);
        let call = params.as_ref();

        let result = self.engine.execute(&call.tool, call.args.clone()).await;
        if result.success {
            Ok(CallToolResult::success(text(&result)))
        } else {
            Ok(CallToolResult::error(text(&result)))
        }
    }

    pub fn list_tools(&self) -> CallToolResult {
        CallToolResult::success(text(ToolCatalog))
    }

    pub async fn rollback_checkpoint(
        &self,
        Parameters(params): Parameters<CheckpointId>,
    ) -> McpResult {
        debug!("rollback_checkpoint: {:?}", params);

        let report = self
            .engine
            .rollback(&params.as_ref().id)
            .await
            .map_err(|e| to_mcp_error("Failed to roll back checkpoint", &e))?;

        let output = RollbackResult(&report);
        if report.is_complete() {
            Ok(CallToolResult::success(text(output)))
        } else {
            Ok(CallToolResult::error(text(output)))
        }
    }

    pub fn confirm_checkpoint(
        &self,
        Parameters(params): Parameters<CheckpointId>,
    ) -> CallToolResult {
        debug!("confirm_checkpoint: {:?}", params);
        let id = &params.as_ref().id;

        let status = OperationStatus::from_bool(
            self.engine.confirm_checkpoint(id),
            format!("Confirmed checkpoint {id}. Its changes are now permanent."),
            format!("Checkpoint {id} not found. It may already be confirmed or rolled back."),
        );
        CallToolResult::success(text(status))
    }

    pub async fn rollback_all(&self) -> McpResult {
        let report = self.engine.rollback_all().await;
        if report.undone.is_empty() && report.failures.is_empty() {
            let status = OperationStatus::success("No outstanding checkpoints to roll back.");
            return Ok(CallToolResult::success(text(status)));
        }

        let output = RollbackResult(&report);
        if report.is_complete() {
            Ok(CallToolResult::success(text(output)))
        } else {
            Ok(CallToolResult::error(text(output)))
        }
    }

    pub fn audit_log(&self, Parameters(params): Parameters<AuditQuery>) -> CallToolResult {
        debug!("audit_log: {:?}", params);

        let records = match params.as_ref().limit {
            Some(n) => self.engine.recent_calls(n),
            None => self.engine.audit_log(),
        };
        CallToolResult::success(text(ToolCalls(records)))
    }

    pub async fn run_plan(&self, Parameters(params): Parameters<CreatePlan>) -> McpResult {
        debug!("run_plan: {:?}", params);

        let mut plan = PlanGenerator::new()
            .generate(params.as_ref())
            .map_err(|e| to_mcp_error("Plan is invalid", &e))?;
        PlanGenerator::approve(&mut plan).map_err(|e| to_mcp_error("Plan is invalid", &e))?;

        let finished = self
            .executor
            .execute(&plan)
            .await
            .map_err(|e| to_mcp_error("Failed to run plan", &e))?;

        let completed = finished.all_steps_completed();
        let output = RunResult::new(finished);
        if completed {
            Ok(CallToolResult::success(text(output)))
        } else {
            Ok(CallToolResult::error(text(output)))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use waypoint_core::{models::Action, store::MemoryStore, ExecutorBuilder, ToolEngineBuilder};

    use super::*;

    fn create_test_handlers(store: &Arc<MemoryStore>) -> McpHandlers {
        let executor = ExecutorBuilder::new(store.clone())
            .with_workspace_root("/w")
            .build();
        let engine = ToolEngineBuilder::new(store.clone())
            .with_workspace_root("/w")
            .auto_approve()
            .build()
            .expect("Failed to build engine");
        McpHandlers::new(Arc::new(executor), Arc::new(engine))
    }

    fn params<T: JsonSchema>(inner: T) -> Parameters<McpParams<T>> {
        Parameters(McpParams(inner))
    }

    fn output(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_write_then_rollback_checkpoint() {
        let store = Arc::new(MemoryStore::with_files([("/w/a.txt", "old")]));
        let handlers = create_test_handlers(&store);

        let written = handlers
            .execute_tool(params(core::ToolCall {
                tool: "workspace_writeFile".to_string(),
                args: json!({"path": "a.txt", "content": "new"}),
            }))
            .await
            .expect("call failed");
        assert_eq!(written.is_error, Some(false));
        assert_eq!(store.file("/w/a.txt").as_deref(), Some("new"));

        let checkpoint = handlers.engine.checkpoints()[0].id.clone();
        let rolled_back = handlers
            .rollback_checkpoint(params(core::CheckpointId { id: checkpoint }))
            .await
            .expect("rollback failed");
        assert!(output(&rolled_back).contains("/w/a.txt"));
        assert_eq!(store.file("/w/a.txt").as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_unknown_checkpoint_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let handlers = create_test_handlers(&store);

        let result = handlers
            .rollback_checkpoint(params(core::CheckpointId {
                id: "cp-missing".to_string(),
            }))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_blocked_call_is_tool_error() {
        let store = Arc::new(MemoryStore::new());
        let handlers = create_test_handlers(&store);

        let result = handlers
            .execute_tool(params(core::ToolCall {
                tool: "workspace_readFile".to_string(),
                args: json!({"path": ".env"}),
            }))
            .await
            .expect("call failed");
        assert_eq!(result.is_error, Some(true));

        let audit = handlers.audit_log(params(core::AuditQuery { limit: Some(5) }));
        assert!(output(&audit).contains("workspace_readFile"));
    }

    #[tokio::test]
    async fn test_run_plan_applies_steps() {
        let store = Arc::new(MemoryStore::new());
        let handlers = create_test_handlers(&store);

        let result = handlers
            .run_plan(params(core::CreatePlan {
                name: "Docs".to_string(),
                steps: vec![core::StepSpec {
                    name: "Readme".to_string(),
                    actions: vec![Action::create("README.md", "# Docs\n")],
                    ..Default::default()
                }],
                ..Default::default()
            }))
            .await
            .expect("run failed");

        assert_eq!(result.is_error, Some(false));
        assert!(output(&result).contains("completed"));
        assert!(store.contains("/w/README.md"));
    }

    #[tokio::test]
    async fn test_invalid_plan_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let handlers = create_test_handlers(&store);

        let result = handlers
            .run_plan(params(core::CreatePlan {
                name: "Empty".to_string(),
                ..Default::default()
            }))
            .await;
        assert!(result.is_err());
        assert!(store.calls().is_empty());
    }
}
