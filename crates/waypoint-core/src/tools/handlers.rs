//! Per-tool argument parsing and execution.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use super::{
    catalog::ToolName,
    retry::Retryable,
    services::{EditorServices, Position},
    ToolEngine,
};
use crate::{
    paths::{self, shell_quote},
    store::{bounded, CommandOutput, StoreError},
};

const DEFAULT_SEARCH_RESULTS: usize = 50;
const DEFAULT_SEMANTIC_RESULTS: usize = 10;
const DEFAULT_LOG_LINES: usize = 100;

/// Why a tool handler failed.
#[derive(Debug)]
pub(crate) enum CallError {
    InvalidArgs(String),
    Store(StoreError),
    /// The command ran; `output` is what it produced.
    CommandFailed { message: String, output: Value },
}

impl From<StoreError> for CallError {
    fn from(e: StoreError) -> Self {
        CallError::Store(e)
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::InvalidArgs(m) => write!(f, "invalid arguments: {m}"),
            CallError::Store(e) => e.fmt(f),
            CallError::CommandFailed { message, .. } => f.write_str(message),
        }
    }
}

impl Retryable for CallError {
    fn is_transient(&self) -> bool {
        matches!(self, CallError::Store(e) if e.is_transient())
    }
}

pub(crate) fn parse<T: DeserializeOwned>(args: &Value) -> Result<T, CallError> {
    serde_json::from_value(args.clone()).map_err(|e| CallError::InvalidArgs(e.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListArgs {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadArgs {
    path: String,
    start_line: Option<usize>,
    end_line: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WriteArgs {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    query: String,
    path: Option<String>,
    max_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SemanticArgs {
    query: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandArgs {
    command: String,
    cwd: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogArgs {
    lines: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiffArgs {
    path: Option<String>,
    #[serde(default)]
    staged: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentArgs {
    path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionalDocumentArgs {
    path: Option<String>,
}

impl ToolEngine {
    /// Runs one tool. Called once per attempt by the retry loop.
    pub(crate) async fn dispatch(&self, tool: ToolName, args: &Value) -> Result<Value, CallError> {
        match tool {
            ToolName::ListFiles => self.list_files(parse(args)?).await,
            ToolName::ReadFile => self.read_file(parse(args)?).await,
            ToolName::WriteFile => self.write_file(parse(args)?).await,
            ToolName::SearchFiles => self.search_files(parse(args)?).await,
            ToolName::RunCommand => self.run_command(parse(args)?).await,
            ToolName::TerminalLogs => {
                let LogArgs { lines } = parse(args)?;
                let lines = self.terminal.tail(lines.unwrap_or(DEFAULT_LOG_LINES));
                Ok(json!({ "lines": lines }))
            }
            ToolName::GitStatus => self.git_status().await,
            ToolName::GitDiff => self.git_diff(parse(args)?).await,
            _ => self.editor_call(tool, args).await,
        }
    }

    fn resolve(&self, path: &str) -> String {
        paths::resolve(&self.config.workspace_root, path)
    }

    async fn run(&self, command: &str, cwd: &str) -> Result<CommandOutput, CallError> {
        Ok(bounded(self.config.call_timeout, self.store.execute(command, Some(cwd))).await?)
    }

    async fn list_files(&self, args: ListArgs) -> Result<Value, CallError> {
        let path = self.resolve(args.path.as_deref().unwrap_or("."));
        let entries = bounded(self.config.call_timeout, self.store.list_dir(&path)).await?;
        Ok(json!({ "path": path, "entries": entries }))
    }

    async fn read_file(&self, args: ReadArgs) -> Result<Value, CallError> {
        let path = self.resolve(&args.path);
        let content = bounded(self.config.call_timeout, self.store.read_file(&path)).await?;
        let total_lines = content.lines().count();

        if args.start_line.is_none() && args.end_line.is_none() {
            let limits = &self.config.summary;
            if limits.needs_summary(&content) {
                return Ok(json!({
                    "path": path,
                    "totalLines": total_lines,
                    "summary": limits.summarize(&content),
                    "hint": format!(
                        "File is large ({total_lines} lines, {} bytes). Call workspace_readFile \
                         again with startLine and endLine to read a specific range.",
                        content.len()
                    ),
                }));
            }
            return Ok(json!({ "path": path, "totalLines": total_lines, "content": content }));
        }

        let start = args.start_line.unwrap_or(1);
        let end = args.end_line.unwrap_or(total_lines).min(total_lines);
        if start == 0 || start > end.max(1) {
            return Err(CallError::InvalidArgs(format!(
                "Line range {start}-{end} is invalid for a file of {total_lines} lines (lines are 1-based)"
            )));
        }
        let range: Vec<&str> = content
            .lines()
            .skip(start - 1)
            .take(end + 1 - start)
            .collect();
        Ok(json!({
            "path": path,
            "startLine": start,
            "endLine": end,
            "totalLines": total_lines,
            "content": range.join("\n"),
        }))
    }

    async fn write_file(&self, args: WriteArgs) -> Result<Value, CallError> {
        let path = self.resolve(&args.path);
        bounded(
            self.config.call_timeout,
            self.store.write_file(&path, &args.content),
        )
        .await?;
        Ok(json!({ "path": path, "bytesWritten": args.content.len() }))
    }

    async fn search_files(&self, args: SearchArgs) -> Result<Value, CallError> {
        if args.query.is_empty() {
            return Err(CallError::InvalidArgs("query must not be empty".to_string()));
        }
        let max = args.max_results.unwrap_or(DEFAULT_SEARCH_RESULTS).max(1);
        let scope = args.path.as_deref().unwrap_or(".");
        let command = format!(
            "grep -rnIF --exclude-dir=.git --exclude-dir=node_modules --exclude=.env \
             --exclude='.env.*' -m {max} -e {} -- {}",
            shell_quote(&args.query),
            shell_quote(scope)
        );
        let output = self.run(&command, &self.config.workspace_root).await?;

        // grep exits 1 when nothing matched
        if !matches!(output.exit_code, Some(0) | Some(1)) && output.stdout.is_empty() {
            return Err(CallError::CommandFailed {
                message: format!("Search failed: {}", output.stderr.trim()),
                output: json!({ "stderr": output.stderr }),
            });
        }

        // Configured blocked paths apply to hits as well as to the scope
        let matches: Vec<Value> = output
            .stdout
            .lines()
            .filter_map(|line| {
                let (file, rest) = line.split_once(':')?;
                let (number, text) = rest.split_once(':')?;
                let file = file.trim_start_matches("./");
                if self.search_hit_blocked(file) {
                    return None;
                }
                Some(json!({
                    "path": file,
                    "line": number.parse::<usize>().ok()?,
                    "text": text,
                }))
            })
            .take(max)
            .collect();
        Ok(json!({ "query": args.query, "count": matches.len(), "matches": matches }))
    }

    fn search_hit_blocked(&self, file: &str) -> bool {
        self.guard.blocked_path(file).is_some()
            || self.guard.blocked_path(&self.resolve(file)).is_some()
    }

    async fn run_command(&self, args: CommandArgs) -> Result<Value, CallError> {
        let cwd = self.resolve(args.cwd.as_deref().unwrap_or("."));
        let output = self.run(&args.command, &cwd).await?;
        self.terminal
            .record(&args.command, &output.stdout, &output.stderr);

        let data = json!({
            "command": args.command,
            "exitCode": output.exit_code,
            "stdout": output.stdout,
            "stderr": output.stderr,
        });
        if output.success() {
            return Ok(data);
        }
        let message = match output.exit_code {
            Some(code) => format!("Command exited with code {code}"),
            None => "Command was terminated by a signal".to_string(),
        };
        Err(CallError::CommandFailed {
            message,
            output: data,
        })
    }

    async fn git_status(&self) -> Result<Value, CallError> {
        let output = self
            .run("git status --porcelain=v1 --branch", &self.config.workspace_root)
            .await?;
        if !output.success() {
            return Err(git_failure(&output));
        }

        let mut branch = None;
        let mut files = Vec::new();
        for line in output.stdout.lines() {
            if let Some(header) = line.strip_prefix("## ") {
                branch = header.split("...").next().map(str::to_string);
            } else if let (Some(status), Some(path)) = (line.get(..2), line.get(3..)) {
                files.push(json!({ "status": status.trim(), "path": path }));
            }
        }
        Ok(json!({ "branch": branch, "clean": files.is_empty(), "files": files }))
    }

    async fn git_diff(&self, args: DiffArgs) -> Result<Value, CallError> {
        let mut command = String::from("git diff");
        if args.staged {
            command.push_str(" --staged");
        }
        if let Some(path) = args.path.as_deref() {
            command.push_str(" -- ");
            command.push_str(&shell_quote(path));
        }
        let output = self.run(&command, &self.config.workspace_root).await?;
        if !output.success() {
            return Err(git_failure(&output));
        }
        let files = output
            .stdout
            .lines()
            .filter(|l| l.starts_with("diff --git "))
            .count();
        Ok(json!({ "files": files, "diff": output.stdout }))
    }

    async fn editor_call(&self, tool: ToolName, args: &Value) -> Result<Value, CallError> {
        let Some(services) = self.services.as_deref() else {
            return Err(StoreError::unsupported(&format!(
                "{tool} (no editor services attached)"
            ))
            .into());
        };
        editor_dispatch(services, tool, args).await
    }
}

async fn editor_dispatch(
    services: &dyn EditorServices,
    tool: ToolName,
    args: &Value,
) -> Result<Value, CallError> {
    let value = match tool {
        ToolName::ActiveFile => services.active_file().await?,
        ToolName::Selection => services.selection().await?,
        ToolName::SemanticSearch => {
            let SemanticArgs { query, limit } = parse(args)?;
            services
                .semantic_search(&query, limit.unwrap_or(DEFAULT_SEMANTIC_RESULTS))
                .await?
        }
        ToolName::Hover => services.hover(&parse::<Position>(args)?).await?,
        ToolName::Definition => services.definition(&parse::<Position>(args)?).await?,
        ToolName::References => services.references(&parse::<Position>(args)?).await?,
        ToolName::Completions => services.completions(&parse::<Position>(args)?).await?,
        ToolName::Symbols => {
            let DocumentArgs { path } = parse(args)?;
            services.symbols(&path).await?
        }
        ToolName::Diagnostics => {
            let OptionalDocumentArgs { path } = parse(args)?;
            services.diagnostics(path.as_deref()).await?
        }
        other => return Err(StoreError::unsupported(other.as_str()).into()),
    };
    Ok(value)
}

fn git_failure(output: &CommandOutput) -> CallError {
    CallError::CommandFailed {
        message: format!("git failed: {}", output.stderr.trim()),
        output: json!({ "exitCode": output.exit_code, "stderr": output.stderr }),
    }
}
