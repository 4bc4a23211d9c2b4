//! Waypoint CLI Application
//!
//! Command-line interface for checkpointed workspace plans and guarded tool
//! calls.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, WaypointMcpServer};
use renderer::TerminalRenderer;
use waypoint_core::Settings;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        workspace,
        config,
        no_color,
        command,
    } = Args::parse();

    let mut settings = Settings::load(config.as_deref()).context("Failed to load settings")?;
    if let Some(dir) = workspace {
        let root = std::path::absolute(&dir)
            .with_context(|| format!("Invalid workspace {}", dir.display()))?;
        settings = settings.with_workspace_root(root.to_string_lossy());
    }

    let renderer = TerminalRenderer::new(!no_color);

    info!("Waypoint started in {}", settings.executor.workspace_root);

    match command {
        Plan { command } => {
            Cli::new(settings, renderer)
                .handle_plan_command(command)
                .await
        }
        Tool { command } => {
            Cli::new(settings, renderer)
                .handle_tool_command(command)
                .await
        }
        Serve(args) => {
            info!("Starting Waypoint MCP server");
            let server = WaypointMcpServer::new(&settings, args.auto_approve)
                .context("Failed to initialize MCP server")?;
            run_stdio_server(server).await.context("MCP server failed")
        }
    }
}
