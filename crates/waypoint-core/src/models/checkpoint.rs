//! Checkpoint model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Pre-mutation content of one file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileBackup {
    /// Resolved path of the file
    pub file_path: String,

    /// Content before the mutation; `None` when the file did not exist
    pub content: Option<String>,
}

/// Undo record for one step (or one tool write).
///
/// A checkpoint is captured before the first byte of its step is written and
/// is never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Checkpoint {
    /// Unique identifier of the checkpoint
    pub id: String,

    /// Step (or tool call) the checkpoint protects
    pub step_id: String,

    /// Timestamp when the snapshot was taken (UTC)
    pub created_at: Timestamp,

    /// One entry per distinct file the step touches
    pub backups: Vec<FileBackup>,
}

impl Checkpoint {
    /// Backup recorded for `file_path`, if the checkpoint covers it.
    pub fn backup(&self, file_path: &str) -> Option<&FileBackup> {
        self.backups.iter().find(|b| b.file_path == file_path)
    }

    /// Number of backed-up files that did not exist before the step.
    pub fn absent_count(&self) -> usize {
        self.backups.iter().filter(|b| b.content.is_none()).count()
    }
}
