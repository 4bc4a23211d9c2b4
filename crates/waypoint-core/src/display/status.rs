//! Status and confirmation message types for operation feedback.

use std::fmt;

/// One-line outcome of an operation that has no richer result to show,
/// such as confirming a checkpoint.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }

    /// Success or failure depending on `ok`.
    pub fn from_bool(
        ok: bool,
        on_success: impl Into<String>,
        on_failure: impl Into<String>,
    ) -> Self {
        if ok {
            Self::success(on_success)
        } else {
            Self::failure(on_failure)
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.success { "Success:" } else { "Error:" };
        writeln!(f, "{prefix} {}", self.message)
    }
}
