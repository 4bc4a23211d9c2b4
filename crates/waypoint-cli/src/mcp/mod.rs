//! MCP server implementation for Waypoint
//!
//! Exposes the guarded tool engine and the plan executor over the Model
//! Context Protocol so an AI assistant can make checkpointed changes to a
//! workspace and undo them.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};
use waypoint_core::{
    store::LocalStore, ExecutorBuilder, PlanExecutor, Settings, ToolEngine, ToolEngineBuilder,
};

pub mod errors;
pub mod handlers;

pub use handlers::{AuditQuery, CheckpointId, CreatePlan, McpResult, ToolCall};

/// MCP server for Waypoint
#[derive(Clone)]
pub struct WaypointMcpServer {
    executor: Arc<PlanExecutor>,
    engine: Arc<ToolEngine>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WaypointMcpServer {
    /// Creates a server over the local filesystem.
    ///
    /// Without `auto_approve`, tools that require confirmation are rejected:
    /// the protocol has no way to ask the user mid-call.
    pub fn new(settings: &Settings, auto_approve: bool) -> Result<Self> {
        let store = Arc::new(LocalStore::new());
        let executor = ExecutorBuilder::new(store.clone())
            .with_config(settings.executor.clone())
            .build();
        let mut engine = ToolEngineBuilder::new(store).with_config(settings.tools.clone());
        if auto_approve {
            engine = engine.auto_approve();
        }

        Ok(Self {
            executor: Arc::new(executor),
            engine: Arc::new(engine.build()?),
            tool_router: Self::tool_router(),
        })
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.executor.clone(), self.engine.clone())
    }

    #[tool(
        name = "execute_tool",
        description = "Run one workspace tool by catalog name, e.g. workspace_readFile with {\"path\": \"src/lib.rs\"}. Calls pass a permission gate (paths under .git, node_modules and .env files are blocked, as are destructive commands), transient failures are retried, and large results are truncated. Every workspace_writeFile is checkpointed: the result carries a checkpoint ID you can roll back or confirm. Use list_tools to see the catalog."
    )]
    async fn execute_tool(&self, params: Parameters<ToolCall>) -> McpResult {
        self.handlers().execute_tool(params).await
    }

    #[tool(
        name = "list_tools",
        description = "List every workspace tool with its permission level (read/write/execute), risk and whether it requires confirmation."
    )]
    async fn list_catalog(&self) -> McpResult {
        Ok(self.handlers().list_tools())
    }

    #[tool(
        name = "rollback_checkpoint",
        description = "Undo one file write by restoring the content captured in its checkpoint. Files that did not exist before the write are deleted. Fails if the checkpoint was already confirmed or rolled back."
    )]
    async fn rollback_checkpoint(&self, params: Parameters<CheckpointId>) -> McpResult {
        self.handlers().rollback_checkpoint(params).await
    }

    #[tool(
        name = "confirm_checkpoint",
        description = "Accept a write by discarding its checkpoint. A confirmed write can no longer be rolled back."
    )]
    async fn confirm_checkpoint(&self, params: Parameters<CheckpointId>) -> McpResult {
        Ok(self.handlers().confirm_checkpoint(params))
    }

    #[tool(
        name = "rollback_all",
        description = "Undo every outstanding write, newest first, restoring the workspace to its state before the first unconfirmed write. Returns what was restored and any file that could not be."
    )]
    async fn rollback_all(&self) -> McpResult {
        self.handlers().rollback_all().await
    }

    #[tool(
        name = "audit_log",
        description = "Show recorded tool calls, oldest first, including blocked and rejected ones, with attempts and duration. Use limit to see only the most recent calls."
    )]
    async fn audit_log(&self, params: Parameters<AuditQuery>) -> McpResult {
        Ok(self.handlers().audit_log(params))
    }

    #[tool(
        name = "run_plan",
        description = "Apply a multi-file change as ordered steps. Each step lists actions (create, modify, delete, rename, move) with paths relative to the workspace. Files are snapshotted before each step; if any step fails, all applied steps are rolled back and the workspace is restored. Returns the final plan with per-step status."
    )]
    async fn run_plan(&self, params: Parameters<CreatePlan>) -> McpResult {
        self.handlers().run_plan(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for WaypointMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "waypoint".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"Waypoint makes workspace changes that can be undone.

## Core Concepts
- **Tools**: single guarded operations (read, write, search, run a command, git status/diff). Writes return a checkpoint ID.
- **Checkpoints**: the content of a file before a write. Roll back to restore it, confirm to keep the write.
- **Plans**: ordered steps of file actions. A failing step rolls back every applied step.

## Workflow
1. Explore with `execute_tool` using `workspace_listFiles`, `workspace_readFile` and `workspace_searchFiles`
2. Make edits with `workspace_writeFile`, or apply a multi-file change with `run_plan`
3. Check the result (`terminal_runCommand`, `git_diff`)
4. `confirm_checkpoint` the writes you keep, `rollback_checkpoint` or `rollback_all` the rest

## Notes
- Large file reads return a summary; read a line range with startLine/endLine
- `audit_log` lists every call, including blocked ones"#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: WaypointMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Waypoint MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
