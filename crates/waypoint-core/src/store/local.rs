//! Backing store over the local filesystem and shell.

use std::path::Path;

use async_trait::async_trait;
use log::debug;
use tokio::{fs, process::Command};

use super::{BackingStore, CommandOutput, DirEntry, StoreError, StoreResult};

/// Filesystem-backed store. Writes and renames create missing parent
/// directories.
#[derive(Debug, Clone, Default)]
pub struct LocalStore;

impl LocalStore {
    pub fn new() -> Self {
        Self
    }
}

async fn ensure_parent(path: &str) -> StoreResult<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::from_io(&e, &format!("create {}", parent.display())))?;
        }
    }
    Ok(())
}

fn shell(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

#[async_trait]
impl BackingStore for LocalStore {
    async fn read_file(&self, path: &str) -> StoreResult<String> {
        fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("read {path}")))
    }

    async fn write_file(&self, path: &str, content: &str) -> StoreResult<()> {
        ensure_parent(path).await?;
        fs::write(path, content)
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("write {path}")))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("delete {path}")))?;
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(path).await
        } else {
            fs::remove_file(path).await
        };
        removed.map_err(|e| StoreError::from_io(&e, &format!("delete {path}")))
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> StoreResult<()> {
        ensure_parent(new_path).await?;
        fs::rename(old_path, new_path)
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("rename {old_path} -> {new_path}")))
    }

    async fn execute(&self, command: &str, cwd: Option<&str>) -> StoreResult<CommandOutput> {
        debug!("execute: {command} (cwd: {cwd:?})");
        let mut cmd = shell(command);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.kill_on_drop(true);

        let output = cmd
            .output()
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("spawn `{command}`")))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>> {
        let mut reader = fs::read_dir(path)
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("list {path}")))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| StoreError::from_io(&e, &format!("list {path}")))?
        {
            let metadata = entry.metadata().await.ok();
            let is_dir = metadata.as_ref().is_some_and(|m| m.is_dir());
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
                size: metadata.filter(|m| m.is_file()).map(|m| m.len()),
            });
        }
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::store::StoreErrorKind;

    fn path_in(dir: &TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_write_creates_parent_directories() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStore::new();
        let file = path_in(&dir, "nested/deeper/file.txt");

        store.write_file(&file, "hello").await.expect("write failed");
        assert_eq!(store.read_file(&file).await.expect("read failed"), "hello");
    }

    #[tokio::test]
    async fn test_missing_file_maps_to_not_found() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStore::new();

        let err = store
            .read_file(&path_in(&dir, "absent.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);

        let err = store.delete(&path_in(&dir, "absent.txt")).await.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_and_list() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStore::new();
        let from = path_in(&dir, "a.txt");
        let to = path_in(&dir, "sub/b.txt");

        store.write_file(&from, "x").await.expect("write failed");
        store.rename(&from, &to).await.expect("rename failed");

        let root = dir.path().to_string_lossy().into_owned();
        let entries = store.list_dir(&root).await.expect("list failed");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "sub");
        assert!(entries[0].is_dir);
        assert_eq!(store.read_file(&to).await.expect("read failed"), "x");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_captures_output_and_exit_code() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = LocalStore::new();
        let cwd = dir.path().to_string_lossy().into_owned();

        let out = store
            .execute("echo hi && echo oops 1>&2 && exit 3", Some(&cwd))
            .await
            .expect("execute failed");
        assert_eq!(out.stdout.trim(), "hi");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }
}
