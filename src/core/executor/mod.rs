//! # Plan Executor
//!
//! Applies a finished `ScanResult` to disk (§4.8): every `Delete` first,
//! then every `KeepAndRename`, so a rename destination can never be
//! occupied by a file that was itself scheduled for deletion. Per-file
//! failures are recorded and do not abort the rest of the batch (§7).

use crate::core::planner::{Action, ScanResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Why a single delete or rename did not happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Io(String),
    RenameConflict,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Io(message) => write!(f, "{message}"),
            FailureReason::RenameConflict => write!(f, "destination already exists"),
        }
    }
}

/// Outcome of executing a plan: counts plus the specific failures, keyed
/// by the path that failed.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub deleted_ok: usize,
    pub deleted_failed: usize,
    pub renamed_ok: usize,
    pub renamed_failed: usize,
    pub failures: HashMap<PathBuf, FailureReason>,
}

impl ExecutionReport {
    fn record_failure(&mut self, path: &Path, reason: FailureReason) {
        self.failures.insert(path.to_path_buf(), reason);
    }
}

/// Executes a `ScanResult` against the filesystem. Only performs
/// `unlink(path)` and `rename(src, dst)` where `parent(src) == parent(dst)`
/// (§6); never writes file content.
pub struct PlanExecutor;

impl PlanExecutor {
    /// Deletes are applied before renames, per the ordering requirement
    /// of §4.8. `UserKeep`/`UserDelete` overrides are honored as the
    /// file's effective action, exactly as they appear on `DisplayFile`.
    pub fn execute(plan: &ScanResult) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for group in &plan.groups {
            for file in &group.files {
                if file.action.is_delete() {
                    Self::delete_one(&file.path, &mut report);
                }
            }
        }

        for group in &plan.groups {
            for file in &group.files {
                if let Action::KeepAndRename { new_stem, .. } = &file.action {
                    Self::rename_one(&file.path, new_stem, &mut report);
                }
            }
        }

        report
    }

    fn delete_one(path: &Path, report: &mut ExecutionReport) {
        match fs::remove_file(path) {
            Ok(()) => report.deleted_ok += 1,
            Err(err) => {
                report.deleted_failed += 1;
                report.record_failure(path, FailureReason::Io(err.to_string()));
            }
        }
    }

    fn rename_one(path: &Path, new_stem: &str, report: &mut ExecutionReport) {
        let destination = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => path.with_file_name(format!("{new_stem}.{ext}")),
            None => path.with_file_name(new_stem),
        };

        if destination.exists() {
            report.renamed_failed += 1;
            report.record_failure(path, FailureReason::RenameConflict);
            return;
        }

        match fs::rename(path, &destination) {
            Ok(()) => report.renamed_ok += 1,
            Err(err) => {
                report.renamed_failed += 1;
                report.record_failure(path, FailureReason::Io(err.to_string()));
            }
        }
    }
}
