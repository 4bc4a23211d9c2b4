use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{PlanCommands, ServeArgs, ToolCommands};

/// Checkpointed workspace plans and guarded tool calls
///
/// Waypoint applies multi-file changes as ordered steps, snapshotting every
/// file before it is touched and rolling applied steps back when one fails.
/// It also runs single tool calls (read, write, search, run a command, git)
/// behind a permission gate with retry, truncation and an audit log, either
/// from the command line or as an MCP (Model Context Protocol) server for
/// AI assistants.
#[derive(Parser)]
#[command(version, about, name = "wp")]
pub struct Args {
    /// Workspace root that relative paths resolve against. Defaults to the
    /// current directory
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Path to a settings file. Defaults to
    /// $XDG_CONFIG_HOME/waypoint/settings.json when it exists
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the Waypoint CLI
///
/// - `plan`: validate and run plan files
/// - `tool`: inspect the tool catalog and make single guarded calls
/// - `serve`: start the MCP server for AI assistant integration
#[derive(Subcommand)]
pub enum Commands {
    /// Validate and run plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// List and call tools
    #[command(alias = "t")]
    Tool {
        #[command(subcommand)]
        command: ToolCommands,
    },
    /// Start the MCP server
    Serve(ServeArgs),
}
