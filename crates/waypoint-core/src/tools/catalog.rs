//! The fixed tool catalog and its permission table.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Every tool the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub enum ToolName {
    #[serde(rename = "workspace_listFiles")]
    ListFiles,
    #[serde(rename = "workspace_readFile")]
    ReadFile,
    #[serde(rename = "workspace_writeFile")]
    WriteFile,
    #[serde(rename = "workspace_searchFiles")]
    SearchFiles,
    #[serde(rename = "workspace_semanticSearch")]
    SemanticSearch,
    #[serde(rename = "editor_getActiveFile")]
    ActiveFile,
    #[serde(rename = "editor_getSelection")]
    Selection,
    #[serde(rename = "terminal_runCommand")]
    RunCommand,
    #[serde(rename = "terminal_getLogs")]
    TerminalLogs,
    #[serde(rename = "git_status")]
    GitStatus,
    #[serde(rename = "git_diff")]
    GitDiff,
    #[serde(rename = "lsp_hover")]
    Hover,
    #[serde(rename = "lsp_definition")]
    Definition,
    #[serde(rename = "lsp_references")]
    References,
    #[serde(rename = "lsp_symbols")]
    Symbols,
    #[serde(rename = "lsp_diagnostics")]
    Diagnostics,
    #[serde(rename = "lsp_completions")]
    Completions,
}

/// What a tool is allowed to do to the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Read,
    Write,
    Execute,
}

/// Risk scale of a tool, `safe < low < medium < high < critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolRisk {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

/// Permission entry of one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPermission {
    pub level: PermissionLevel,
    pub risk: ToolRisk,
    pub require_confirmation: bool,
}

const READ_ONLY: ToolPermission = ToolPermission {
    level: PermissionLevel::Read,
    risk: ToolRisk::Safe,
    require_confirmation: false,
};

impl ToolName {
    pub const ALL: [ToolName; 17] = [
        ToolName::ListFiles,
        ToolName::ReadFile,
        ToolName::WriteFile,
        ToolName::SearchFiles,
        ToolName::SemanticSearch,
        ToolName::ActiveFile,
        ToolName::Selection,
        ToolName::RunCommand,
        ToolName::TerminalLogs,
        ToolName::GitStatus,
        ToolName::GitDiff,
        ToolName::Hover,
        ToolName::Definition,
        ToolName::References,
        ToolName::Symbols,
        ToolName::Diagnostics,
        ToolName::Completions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListFiles => "workspace_listFiles",
            ToolName::ReadFile => "workspace_readFile",
            ToolName::WriteFile => "workspace_writeFile",
            ToolName::SearchFiles => "workspace_searchFiles",
            ToolName::SemanticSearch => "workspace_semanticSearch",
            ToolName::ActiveFile => "editor_getActiveFile",
            ToolName::Selection => "editor_getSelection",
            ToolName::RunCommand => "terminal_runCommand",
            ToolName::TerminalLogs => "terminal_getLogs",
            ToolName::GitStatus => "git_status",
            ToolName::GitDiff => "git_diff",
            ToolName::Hover => "lsp_hover",
            ToolName::Definition => "lsp_definition",
            ToolName::References => "lsp_references",
            ToolName::Symbols => "lsp_symbols",
            ToolName::Diagnostics => "lsp_diagnostics",
            ToolName::Completions => "lsp_completions",
        }
    }

    pub fn permission(&self) -> ToolPermission {
        match self {
            ToolName::WriteFile => ToolPermission {
                level: PermissionLevel::Write,
                risk: ToolRisk::Medium,
                require_confirmation: true,
            },
            ToolName::RunCommand => ToolPermission {
                level: PermissionLevel::Execute,
                risk: ToolRisk::High,
                require_confirmation: true,
            },
            _ => READ_ONLY,
        }
    }

    /// One-line description used by `wp tool list` and the MCP server.
    pub fn description(&self) -> &'static str {
        match self {
            ToolName::ListFiles => "List a directory (args: path?)",
            ToolName::ReadFile => {
                "Read a file; large files are summarized (args: path, startLine?, endLine?)"
            }
            ToolName::WriteFile => "Write a file, checkpointed (args: path, content)",
            ToolName::SearchFiles => "Fixed-string search (args: query, path?, maxResults?)",
            ToolName::SemanticSearch => "Semantic code search (args: query, limit?)",
            ToolName::ActiveFile => "File open in the editor",
            ToolName::Selection => "Current editor selection",
            ToolName::RunCommand => "Run a shell command (args: command, cwd?)",
            ToolName::TerminalLogs => "Recent command output (args: lines?)",
            ToolName::GitStatus => "Working tree status",
            ToolName::GitDiff => "Diff of the working tree (args: path?, staged?)",
            ToolName::Hover => "Hover info (args: path, line, character)",
            ToolName::Definition => "Go to definition (args: path, line, character)",
            ToolName::References => "Find references (args: path, line, character)",
            ToolName::Symbols => "Document symbols (args: path)",
            ToolName::Diagnostics => "Diagnostics (args: path?)",
            ToolName::Completions => "Completions (args: path, line, character)",
        }
    }

    /// Whether the tool is served by editor services rather than the store.
    pub fn needs_editor(&self) -> bool {
        matches!(
            self,
            ToolName::SemanticSearch
                | ToolName::ActiveFile
                | ToolName::Selection
                | ToolName::Hover
                | ToolName::Definition
                | ToolName::References
                | ToolName::Symbols
                | ToolName::Diagnostics
                | ToolName::Completions
        )
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown tool: {s}"))
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionLevel::Read => "read",
            PermissionLevel::Write => "write",
            PermissionLevel::Execute => "execute",
        }
    }
}

impl ToolRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolRisk::Safe => "safe",
            ToolRisk::Low => "low",
            ToolRisk::Medium => "medium",
            ToolRisk::High => "high",
            ToolRisk::Critical => "critical",
        }
    }
}
