//! Checkpoint capture, storage and best-effort restore.
//!
//! A checkpoint records the content of every file a step (or a tool write)
//! is about to touch, before anything is written. Restoring walks the
//! backups: files that did not exist are deleted, everything else is
//! rewritten with its recorded content. Individual restore failures never
//! stop the remaining restores; they are collected in a [`RollbackReport`].

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use jiff::Timestamp;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    models::{Checkpoint, FileBackup},
    store::{bounded, BackingStore, StoreErrorKind},
};

/// Which restore operation failed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestoreOp {
    Write,
    Delete,
    Rename,
}

impl RestoreOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreOp::Write => "write",
            RestoreOp::Delete => "delete",
            RestoreOp::Rename => "rename",
        }
    }
}

/// A restore that could not be applied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollbackFailure {
    pub file_path: String,
    pub operation: RestoreOp,
    pub error: String,
}

/// What a rollback did, including what it could not do.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RollbackReport {
    /// IDs of the steps or checkpoints undone, in undo order
    pub undone: Vec<String>,
    /// Files rewritten with their backed-up content
    pub restored: Vec<String>,
    /// Files deleted because they did not exist before
    pub deleted: Vec<String>,
    /// Renames reversed, as `(from, to)` of the reversal
    pub renamed: Vec<(String, String)>,
    /// Steps that had no checkpoint left to restore from
    pub skipped: Vec<String>,
    pub failures: Vec<RollbackFailure>,
}

impl RollbackReport {
    /// Whether every restore succeeded and nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// Appends everything `other` recorded.
    pub fn merge(&mut self, other: RollbackReport) {
        self.undone.extend(other.undone);
        self.restored.extend(other.restored);
        self.deleted.extend(other.deleted);
        self.renamed.extend(other.renamed);
        self.skipped.extend(other.skipped);
        self.failures.extend(other.failures);
    }

    /// Paths whose restore failed, for "rollback incomplete" messages.
    pub fn failed_paths(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.file_path.as_str()).collect()
    }
}

/// Snapshots `paths` through `store`.
///
/// Duplicate paths are captured once. A path whose read fails for any reason
/// is recorded as absent rather than aborting the checkpoint.
pub async fn capture<I>(
    store: &dyn BackingStore,
    step_id: &str,
    paths: I,
    timeout: Option<Duration>,
) -> Checkpoint
where
    I: IntoIterator<Item = String>,
{
    let mut backups: Vec<FileBackup> = Vec::new();
    for path in paths {
        if backups.iter().any(|b| b.file_path == path) {
            continue;
        }
        let content = match bounded(timeout, store.read_file(&path)).await {
            Ok(content) => Some(content),
            Err(e) if e.kind == StoreErrorKind::NotFound => None,
            Err(e) => {
                warn!("Checkpoint read of {path} failed, recording as absent: {e}");
                None
            }
        };
        backups.push(FileBackup {
            file_path: path,
            content,
        });
    }

    let checkpoint = Checkpoint {
        id: format!("cp-{}", uuid::Uuid::new_v4().simple()),
        step_id: step_id.to_string(),
        created_at: Timestamp::now(),
        backups,
    };
    debug!(
        "Captured checkpoint {} for {} ({} files, {} absent)",
        checkpoint.id,
        step_id,
        checkpoint.backups.len(),
        checkpoint.absent_count()
    );
    checkpoint
}

/// Restores `checkpoint`, first reversing `renames` (given as the original
/// `(from, to)` pairs, undone newest first).
pub async fn restore(
    store: &dyn BackingStore,
    checkpoint: &Checkpoint,
    renames: &[(String, String)],
    timeout: Option<Duration>,
) -> RollbackReport {
    let mut report = RollbackReport {
        undone: vec![checkpoint.step_id.clone()],
        ..RollbackReport::default()
    };

    for (from, to) in renames.iter().rev() {
        match bounded(timeout, store.rename(to, from)).await {
            Ok(()) => report.renamed.push((to.clone(), from.clone())),
            Err(e) if e.kind == StoreErrorKind::NotFound => {
                debug!("Rename reversal {to} -> {from} skipped: {e}");
            }
            Err(e) => report.failures.push(RollbackFailure {
                file_path: to.clone(),
                operation: RestoreOp::Rename,
                error: e.to_string(),
            }),
        }
    }

    for backup in &checkpoint.backups {
        match &backup.content {
            None => match bounded(timeout, store.delete(&backup.file_path)).await {
                Ok(()) => report.deleted.push(backup.file_path.clone()),
                // Already gone is the state we wanted
                Err(e) if e.kind == StoreErrorKind::NotFound => {}
                Err(e) => report.failures.push(RollbackFailure {
                    file_path: backup.file_path.clone(),
                    operation: RestoreOp::Delete,
                    error: e.to_string(),
                }),
            },
            Some(content) => {
                match bounded(timeout, store.write_file(&backup.file_path, content)).await {
                    Ok(()) => report.restored.push(backup.file_path.clone()),
                    Err(e) => report.failures.push(RollbackFailure {
                        file_path: backup.file_path.clone(),
                        operation: RestoreOp::Write,
                        error: e.to_string(),
                    }),
                }
            }
        }
    }

    if !report.is_complete() {
        warn!(
            "Rollback of {} incomplete for: {}",
            checkpoint.step_id,
            report.failed_paths().join(", ")
        );
    }
    report
}

/// In-memory checkpoints owned by one engine, kept in creation order.
#[derive(Debug, Default)]
pub struct CheckpointStore {
    entries: Mutex<Vec<(String, Checkpoint)>>,
}

impl CheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(String, Checkpoint)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `checkpoint` under `key`, replacing an older entry.
    pub fn insert(&self, key: impl Into<String>, checkpoint: Checkpoint) {
        let key = key.into();
        let mut entries = self.entries();
        entries.retain(|(k, _)| *k != key);
        entries.push((key, checkpoint));
    }

    pub fn get(&self, key: &str) -> Option<Checkpoint> {
        self.entries()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cp)| cp.clone())
    }

    pub fn remove(&self, key: &str) -> Option<Checkpoint> {
        let mut entries = self.entries();
        let index = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(index).1)
    }

    /// Discards a checkpoint once its outcome is accepted. Returns `false`
    /// when there was nothing to discard.
    pub fn confirm(&self, key: &str) -> bool {
        self.remove(key).is_some()
    }

    /// Outstanding checkpoints, oldest first.
    pub fn list(&self) -> Vec<Checkpoint> {
        self.entries().iter().map(|(_, cp)| cp.clone()).collect()
    }

    /// Removes and returns every checkpoint, newest first.
    pub fn drain_newest_first(&self) -> Vec<(String, Checkpoint)> {
        let mut drained: Vec<_> = self.entries().drain(..).collect();
        drained.reverse();
        drained
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
