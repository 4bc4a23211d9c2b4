use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary workspace for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color and an explicit
/// workspace
fn wp_cmd(workspace: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wp").expect("Failed to find wp binary");
    cmd.arg("--no-color")
        .arg("--workspace")
        .arg(workspace)
        .env("XDG_CONFIG_HOME", workspace.join(".config"));
    cmd
}

fn write_plan(dir: &Path, json: &str) -> String {
    let path = dir.join("plan.json");
    std::fs::write(&path, json).expect("Failed to write plan file");
    path.to_string_lossy().into_owned()
}

const EDIT_PLAN: &str = r#"{
    "name": "Add docs",
    "steps": [
        {
            "name": "Write readme",
            "actions": [{"type": "create", "file_path": "README.md", "new_content": "hello"}]
        },
        {
            "name": "Update notes",
            "actions": [{"type": "modify", "file_path": "notes.txt", "new_content": "v2"}]
        }
    ]
}"#;

#[test]
fn test_cli_tool_list() {
    let temp_dir = create_cli_test_environment();

    wp_cmd(temp_dir.path())
        .args(["tool", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("workspace_writeFile"))
        .stdout(predicate::str::contains("terminal_runCommand"))
        .stdout(predicate::str::contains("| Tool | Permission | Risk |"));
}

#[test]
fn test_cli_plan_validate_shows_impact() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(temp_dir.path(), EDIT_PLAN);

    wp_cmd(temp_dir.path())
        .args(["plan", "validate", &plan])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Add docs"))
        .stdout(predicate::str::contains("Write readme"))
        .stdout(predicate::str::contains("draft"));

    // Validation never touches the workspace
    assert!(!temp_dir.path().join("README.md").exists());
}

#[test]
fn test_cli_plan_validate_reports_problems() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        r#"{"name": "Broken", "steps": [{"name": "No actions"}]}"#,
    );

    wp_cmd(temp_dir.path())
        .args(["plan", "validate", &plan])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no actions"));
}

#[test]
fn test_cli_plan_run_applies_changes() {
    let temp_dir = create_cli_test_environment();
    std::fs::write(temp_dir.path().join("notes.txt"), "v1").expect("Failed to write notes");
    let plan = write_plan(temp_dir.path(), EDIT_PLAN);

    wp_cmd(temp_dir.path())
        .args(["plan", "run", &plan])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan 'Add docs' completed"));

    let read = |name: &str| {
        std::fs::read_to_string(temp_dir.path().join(name)).expect("file missing")
    };
    assert_eq!(read("README.md"), "hello");
    assert_eq!(read("notes.txt"), "v2");
}

#[test]
fn test_cli_plan_run_rolls_back_on_failure() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        temp_dir.path(),
        r#"{
            "name": "Doomed",
            "steps": [
                {"name": "Create", "actions": [{"type": "create", "file_path": "a.txt", "new_content": "a"}]},
                {"name": "Delete missing", "actions": [{"type": "delete", "file_path": "missing.txt"}]}
            ]
        }"#,
    );

    wp_cmd(temp_dir.path())
        .args(["plan", "run", &plan])
        .assert()
        .failure()
        .stdout(predicate::str::contains("rolled back"));

    assert!(!temp_dir.path().join("a.txt").exists());
}

#[test]
fn test_cli_plan_dry_run_leaves_workspace_alone() {
    let temp_dir = create_cli_test_environment();
    std::fs::write(temp_dir.path().join("notes.txt"), "v1").expect("Failed to write notes");
    let plan = write_plan(temp_dir.path(), EDIT_PLAN);

    wp_cmd(temp_dir.path())
        .args(["plan", "run", "--dry-run", &plan])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!temp_dir.path().join("README.md").exists());
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("notes.txt")).expect("notes missing"),
        "v1"
    );
}

#[test]
fn test_cli_plan_schema() {
    let temp_dir = create_cli_test_environment();

    wp_cmd(temp_dir.path())
        .args(["plan", "schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"steps\""))
        .stdout(predicate::str::contains("\"name\""));
}

#[test]
fn test_cli_tool_call_reads_file() {
    let temp_dir = create_cli_test_environment();
    std::fs::write(temp_dir.path().join("hello.txt"), "hi there").expect("Failed to write");

    wp_cmd(temp_dir.path())
        .args(["tool", "call", "workspace_readFile", "--args", r#"{"path":"hello.txt"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("hi there"));
}

#[test]
fn test_cli_tool_call_write_requires_confirmation() {
    let temp_dir = create_cli_test_environment();
    let args = r#"{"path":"out.txt","content":"data"}"#;

    wp_cmd(temp_dir.path())
        .args(["tool", "call", "workspace_writeFile", "--args", args])
        .assert()
        .failure();
    assert!(!temp_dir.path().join("out.txt").exists());

    wp_cmd(temp_dir.path())
        .args(["tool", "call", "workspace_writeFile", "--yes", "--args", args])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checkpoint: "));
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("out.txt")).expect("out.txt missing"),
        "data"
    );
}

#[test]
fn test_cli_tool_call_blocked_path() {
    let temp_dir = create_cli_test_environment();

    wp_cmd(temp_dir.path())
        .args(["tool", "call", "workspace_readFile", "--args", r#"{"path":".env"}"#])
        .assert()
        .failure()
        .stdout(predicate::str::contains("blocked"));
}

#[test]
fn test_cli_missing_config_file_fails() {
    let temp_dir = create_cli_test_environment();
    let missing = temp_dir.path().join("nope.json");

    wp_cmd(temp_dir.path())
        .arg("--config")
        .arg(&missing)
        .args(["tool", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}
