//! In-memory backing store with call recording and fault injection.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;

use super::{BackingStore, CommandOutput, DirEntry, StoreError, StoreResult};

/// Kind of store call, as recorded by [`MemoryStore::calls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Read,
    Write,
    Delete,
    Rename,
    Execute,
    ListDir,
}

/// One recorded store call. For `Execute` the target is the command line,
/// for `Rename` it is the source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub target: String,
}

#[derive(Debug)]
struct Fault {
    op: StoreOp,
    target: Option<String>,
    error: StoreError,
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<String, String>,
    calls: Vec<StoreCall>,
    faults: Vec<Fault>,
    commands: Vec<(String, CommandOutput)>,
}

impl State {
    fn take_fault(&mut self, op: StoreOp, target: &str) -> Option<StoreError> {
        let index = self
            .faults
            .iter()
            .position(|f| f.op == op && f.target.as_deref().map_or(true, |t| t == target))?;
        let fault = &mut self.faults[index];
        let error = fault.error.clone();
        if let Some(remaining) = fault.remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.faults.remove(index);
            }
        }
        Some(error)
    }
}

/// A workspace held entirely in memory.
///
/// Commands return the output registered with [`MemoryStore::on_command`]
/// for the longest matching prefix, or an empty successful output.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `files`.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: Into<String>,
        C: Into<String>,
    {
        let store = Self::new();
        {
            let mut state = store.state();
            for (path, content) in files {
                state.files.insert(path.into(), content.into());
            }
        }
        store
    }

    /// Delays every call by `latency` before it takes effect.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, path: impl Into<String>, content: impl Into<String>) {
        self.state().files.insert(path.into(), content.into());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.state().files.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state().files.contains_key(path)
    }

    pub fn files(&self) -> BTreeMap<String, String> {
        self.state().files.clone()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state().calls.clone()
    }

    /// Targets of the recorded calls of one kind, in order.
    pub fn calls_for(&self, op: StoreOp) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|c| c.op == op)
            .map(|c| c.target.clone())
            .collect()
    }

    /// Makes every `op` on `target` (or on anything when `None`) fail.
    pub fn fail(&self, op: StoreOp, target: Option<&str>, error: StoreError) {
        self.push_fault(op, target, error, None);
    }

    /// Makes the next `times` matching calls fail, then recover.
    pub fn fail_times(&self, op: StoreOp, target: Option<&str>, error: StoreError, times: usize) {
        if times > 0 {
            self.push_fault(op, target, error, Some(times));
        }
    }

    fn push_fault(
        &self,
        op: StoreOp,
        target: Option<&str>,
        error: StoreError,
        remaining: Option<usize>,
    ) {
        self.state().faults.push(Fault {
            op,
            target: target.map(str::to_string),
            error,
            remaining,
        });
    }

    /// Registers the output returned for commands starting with `prefix`.
    pub fn on_command(&self, prefix: impl Into<String>, output: CommandOutput) {
        self.state().commands.push((prefix.into(), output));
    }

    async fn begin(&self, op: StoreOp, target: &str) -> StoreResult<()> {
        self.state().calls.push(StoreCall {
            op,
            target: target.to_string(),
        });
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.state().take_fault(op, target) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn read_file(&self, path: &str) -> StoreResult<String> {
        self.begin(StoreOp::Read, path).await?;
        self.file(path).ok_or_else(|| StoreError::not_found(path))
    }

    async fn write_file(&self, path: &str, content: &str) -> StoreResult<()> {
        self.begin(StoreOp::Write, path).await?;
        self.insert(path, content);
        Ok(())
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.begin(StoreOp::Delete, path).await?;
        let mut state = self.state();
        let dir_prefix = format!("{}/", path.trim_end_matches('/'));
        let before = state.files.len();
        state
            .files
            .retain(|key, _| key != path && !key.starts_with(&dir_prefix));
        if state.files.len() == before {
            return Err(StoreError::not_found(path));
        }
        Ok(())
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> StoreResult<()> {
        self.begin(StoreOp::Rename, old_path).await?;
        let mut state = self.state();
        let content = state
            .files
            .remove(old_path)
            .ok_or_else(|| StoreError::not_found(old_path))?;
        state.files.insert(new_path.to_string(), content);
        Ok(())
    }

    async fn execute(&self, command: &str, _cwd: Option<&str>) -> StoreResult<CommandOutput> {
        self.begin(StoreOp::Execute, command).await?;
        let state = self.state();
        let output = state
            .commands
            .iter()
            .filter(|(prefix, _)| command.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }

    async fn list_dir(&self, path: &str) -> StoreResult<Vec<DirEntry>> {
        self.begin(StoreOp::ListDir, path).await?;
        let state = self.state();
        let prefix = format!("{}/", path.trim_end_matches('/'));

        let mut entries: BTreeMap<String, DirEntry> = BTreeMap::new();
        for (key, content) in state.files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            let entry = match rest.split_once('/') {
                Some((dir, _)) => DirEntry {
                    name: dir.to_string(),
                    is_dir: true,
                    size: None,
                },
                None => DirEntry {
                    name: rest.to_string(),
                    is_dir: false,
                    size: Some(content.len() as u64),
                },
            };
            entries.entry(entry.name.clone()).or_insert(entry);
        }

        if entries.is_empty() {
            return Err(StoreError::not_found(path));
        }
        let mut listing: Vec<DirEntry> = entries.into_values().collect();
        listing.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreErrorKind;

    #[tokio::test]
    async fn test_fail_times_recovers() {
        let store = MemoryStore::with_files([("/w/a.txt", "A")]);
        store.fail_times(
            StoreOp::Read,
            Some("/w/a.txt"),
            StoreError::new(StoreErrorKind::Timeout, "slow disk"),
            2,
        );

        assert!(store.read_file("/w/a.txt").await.is_err());
        assert!(store.read_file("/w/a.txt").await.is_err());
        assert_eq!(store.read_file("/w/a.txt").await.unwrap(), "A");
        assert_eq!(store.calls_for(StoreOp::Read).len(), 3);
    }

    #[tokio::test]
    async fn test_list_dir_groups_nested_entries() {
        let store = MemoryStore::with_files([
            ("/w/src/main.rs", "fn main() {}"),
            ("/w/src/lib/mod.rs", ""),
            ("/w/README.md", "# hi"),
        ]);

        let root = store.list_dir("/w").await.unwrap();
        let names: Vec<_> = root.iter().map(|e| (e.name.as_str(), e.is_dir)).collect();
        assert_eq!(names, vec![("src", true), ("README.md", false)]);

        let src = store.list_dir("/w/src").await.unwrap();
        assert_eq!(src.len(), 2);
        assert!(store.list_dir("/w/missing").await.is_err());
    }

    #[tokio::test]
    async fn test_command_prefix_matching() {
        let store = MemoryStore::new();
        store.on_command("git", CommandOutput::ok("generic"));
        store.on_command("git status", CommandOutput::ok("M a.txt"));

        let out = store.execute("git status --porcelain", None).await.unwrap();
        assert_eq!(out.stdout, "M a.txt");
        let out = store.execute("git log", None).await.unwrap();
        assert_eq!(out.stdout, "generic");
        let out = store.execute("ls", None).await.unwrap();
        assert!(out.success());
    }
}
