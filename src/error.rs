//! Error types for tasktrack
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (validation, bad args, not logged in, unknown task)
//! - 4: Operation failed (I/O, corrupt config, lock contention)

use std::path::PathBuf;
use thiserror::Error;

use crate::task::TaskId;

/// Exit codes for the tasktrack CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasktrack operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("{0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::NotLoggedIn
            | Error::TaskNotFound(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::LockFailed(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Whether this error should be shown inline to the user rather than
    /// treated as a failure of the tool itself.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            _ => None,
        }
    }
}

/// Result type alias for tasktrack operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_user_errors() {
        let err = Error::Validation("Task title is required".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Task title is required");
    }

    #[test]
    fn io_errors_are_operation_failures() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
        assert!(!err.is_validation());
    }

    #[test]
    fn task_not_found_carries_id_details() {
        let err = Error::TaskNotFound(42);
        assert_eq!(err.details(), Some(serde_json::json!({ "id": 42 })));
    }
}
