//! # Error Module
//!
//! User-friendly error types for the media cleanup core.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Per-file failures are not fatal** - only access denial or
//!   cancellation abort the pipeline (see the propagation policy in the
//!   pipeline module)

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum MediaCleanupError {
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Scan error: {0}")]
    Walk(#[from] WalkError),

    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    #[error("Execution error: {0}")]
    Execute(#[from] ExecuteError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fatal errors acquiring scoped access to the root directory.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Access denied to {path}: {reason}")]
    Denied { path: PathBuf, reason: String },

    #[error("{path} does not exist or is not a directory")]
    NotADirectory { path: PathBuf },
}

/// Non-fatal errors encountered while walking a subtree or hashing a file.
#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Failed to read subtree {subtree}: {cause}")]
    Subtree {
        subtree: PathBuf,
        #[source]
        cause: std::io::Error,
    },

    #[error("Permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error hashing {path}: {cause}")]
    Io {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
}

/// Errors encountered while synthesizing a plan. Currently unused by the
/// live Planner (§4.6 never fails outright - conflicts are downgraded in
/// place) but kept for forward compatibility with stricter policies.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("No files to plan")]
    Empty,
}

/// Per-file outcomes recorded in an `ExecutionReport`, not raised as `Result::Err`.
#[derive(Error, Debug, Clone)]
pub enum ExecuteError {
    #[error("Rename conflict: {dst} already exists (from {src})")]
    RenameConflict { src: PathBuf, dst: PathBuf },

    #[error("Failed to delete {path}: {reason}")]
    DeleteFailure { path: PathBuf, reason: String },

    #[error("Failed to rename {src} to {dst}: {reason}")]
    RenameFailure {
        src: PathBuf,
        dst: PathBuf,
        reason: String,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, MediaCleanupError>;

/// Sentinel returned by `scan` when the pipeline was cancelled before a
/// `ScanResult` could be produced. No partial plan is ever exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;
