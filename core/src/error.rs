//! Error types for the pvw-core library.

use thiserror::Error;

/// Result type alias for pvw operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, parsing and acting on processes.
#[derive(Error, Debug)]
pub enum Error {
    /// The capture command could not be run or exited abnormally.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// The capture text did not follow the lsof field grammar.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// The process to terminate does not exist.
    #[error("Process with PID {0} not found")]
    ProcessNotFound(u32),

    /// Permission denied for an operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Failed to kill a process.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: u32, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

impl Error {
    /// Whether this error came from a termination request.
    ///
    /// Termination failures are non-fatal: the view keeps its rows and the
    /// snapshot cache stays valid.
    pub fn is_termination_failure(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::PermissionDenied(_) | Error::KillFailed { .. }
        )
    }
}
