//! Backing store boundary used by the executor and the tool engine.
//!
//! Every workspace side effect goes through a [`BackingStore`]. Failures are
//! ordinary [`StoreError`] values carrying a structured [`StoreErrorKind`],
//! which is what the retry policy and rollback bookkeeping branch on.
//!
//! Two implementations ship with the crate:
//!
//! - [`LocalStore`]: the real filesystem plus a shell for commands
//! - [`MemoryStore`]: an in-memory workspace with call recording and fault
//!   injection, used by tests and dry runs

use std::{fmt, future::Future, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::{MemoryStore, StoreCall, StoreOp};

/// Classification of a backing store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreErrorKind {
    NotFound,
    PermissionDenied,
    AlreadyExists,
    InvalidPath,
    Timeout,
    ConnectionReset,
    Network,
    Unsupported,
    Other,
}

impl StoreErrorKind {
    /// Whether an operation failing with this kind may succeed on retry.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            StoreErrorKind::Timeout | StoreErrorKind::ConnectionReset | StoreErrorKind::Network
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::PermissionDenied => "permission_denied",
            StoreErrorKind::AlreadyExists => "already_exists",
            StoreErrorKind::InvalidPath => "invalid_path",
            StoreErrorKind::Timeout => "timeout",
            StoreErrorKind::ConnectionReset => "connection_reset",
            StoreErrorKind::Network => "network",
            StoreErrorKind::Unsupported => "unsupported",
            StoreErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<std::io::ErrorKind> for StoreErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        use std::io::ErrorKind as Io;
        match kind {
            Io::NotFound => StoreErrorKind::NotFound,
            Io::PermissionDenied => StoreErrorKind::PermissionDenied,
            Io::AlreadyExists => StoreErrorKind::AlreadyExists,
            Io::InvalidInput => StoreErrorKind::InvalidPath,
            Io::TimedOut => StoreErrorKind::Timeout,
            Io::ConnectionReset | Io::ConnectionAborted | Io::BrokenPipe => {
                StoreErrorKind::ConnectionReset
            }
            Io::ConnectionRefused | Io::NotConnected | Io::AddrNotAvailable => {
                StoreErrorKind::Network
            }
            _ => StoreErrorKind::Other,
        }
    }
}

/// A failed backing store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({kind})")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StoreErrorKind::NotFound, format!("No such file: {path}"))
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            StoreErrorKind::Timeout,
            format!("Operation timed out after {}ms", after.as_millis()),
        )
    }

    pub fn unsupported(operation: &str) -> Self {
        Self::new(
            StoreErrorKind::Unsupported,
            format!("{operation} is not supported by this backend"),
        )
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    pub(crate) fn from_io(err: &std::io::Error, context: &str) -> Self {
        Self::new(err.kind().into(), format!("{context}: {err}"))
    }
}

/// Result alias for backing store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Captured output of a shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The workspace side-effect boundary.
///
/// Paths handed to a store are already resolved against the workspace root.
#[async_trait]
pub trait BackingStore: Send + Sync {
    async fn read_file(&self, path: &str) -> StoreResult<String>;

    async fn write_file(&self, path: &str, content: &str) -> StoreResult<()>;

    async fn delete(&self, path: &str) -> StoreResult<()>;

    async fn rename(&self, old_path: &str, new_path: &str) -> StoreResult<()>;

    async fn execute(&self, command: &str, cwd: Option<&str>) -> StoreResult<CommandOutput>;

    async fn list_dir(&self, _path: &str) -> StoreResult<Vec<DirEntry>> {
        Err(StoreError::unsupported("list_dir"))
    }
}

/// Runs a store call, turning an elapsed deadline into a `Timeout` error.
pub(crate) async fn bounded<T, F>(limit: Option<Duration>, call: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(StoreError::timeout(limit))),
        None => call.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreErrorKind::Timeout.is_transient());
        assert!(StoreErrorKind::ConnectionReset.is_transient());
        assert!(StoreErrorKind::Network.is_transient());
        assert!(!StoreErrorKind::NotFound.is_transient());
        assert!(!StoreErrorKind::PermissionDenied.is_transient());
        assert!(!StoreErrorKind::Other.is_transient());
    }

    #[test]
    fn test_io_kind_mapping() {
        assert_eq!(
            StoreErrorKind::from(std::io::ErrorKind::NotFound),
            StoreErrorKind::NotFound
        );
        assert_eq!(
            StoreErrorKind::from(std::io::ErrorKind::TimedOut),
            StoreErrorKind::Timeout
        );
        assert_eq!(
            StoreErrorKind::from(std::io::ErrorKind::BrokenPipe),
            StoreErrorKind::ConnectionReset
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_times_out() {
        let result: StoreResult<()> = bounded(Some(Duration::from_millis(10)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        let err = result.unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_bounded_without_limit_passes_through() {
        let result = bounded(None, async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result, Ok(7));
    }
}
