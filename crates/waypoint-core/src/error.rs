//! Error types for the waypoint library.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Comprehensive error type for all plan and tool operations.
#[derive(Error, Debug)]
pub enum WaypointError {
    /// Another plan is already running on this executor
    #[error("Plan '{running}' is already running on this executor")]
    PlanAlreadyRunning { running: String },
    /// Structural validation of a plan failed
    #[error("Plan validation failed: {}", .problems.join("; "))]
    Validation { problems: Vec<String> },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Checkpoint not found (already confirmed, rolled back or never created)
    #[error("Checkpoint '{id}' not found")]
    CheckpointNotFound { id: String },
    /// Backing store call failed
    #[error("{operation} failed: {source}")]
    Store {
        operation: String,
        #[source]
        source: StoreError,
    },
    /// Local file system errors outside the backing store (config files)
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> WaypointError {
        WaypointError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

/// Builder for wrapping backing store failures with the operation name.
pub struct StoreErrorBuilder {
    operation: String,
}

impl StoreErrorBuilder {
    /// Create a new store error builder for an operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: StoreError) -> WaypointError {
        WaypointError::Store {
            operation: self.operation,
            source,
        }
    }
}

impl WaypointError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a builder for backing store errors.
    pub fn store(operation: impl Into<String>) -> StoreErrorBuilder {
        StoreErrorBuilder::new(operation)
    }

    /// Whether this error was raised before any side effect could happen.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WaypointError::Validation { .. } | WaypointError::InvalidInput { .. }
        )
    }
}

/// Extension trait attaching the operation name to backing store results.
pub trait StoreResultExt<T> {
    /// Map store errors to [`WaypointError::Store`] for `operation`.
    fn store_context(self, operation: &str) -> Result<T>;
}

impl<T> StoreResultExt<T> for std::result::Result<T, StoreError> {
    fn store_context(self, operation: &str) -> Result<T> {
        self.map_err(|e| WaypointError::store(operation).with_source(e))
    }
}

/// Result type alias for waypoint operations
pub type Result<T> = std::result::Result<T, WaypointError>;
