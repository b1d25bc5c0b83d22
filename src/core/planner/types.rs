//! Data model for the plan a scan produces (§3).

use crate::core::hasher::Fingerprint;
use crate::core::scanner::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A discovered file with its content fingerprint, once hashed.
/// Immutable after fingerprinting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size: u64,
    pub kind: MediaKind,
    /// `None` when hashing failed; such files are never grouped as
    /// content duplicates but are still considered by name grouping.
    #[serde(skip)]
    pub fingerprint: Option<Fingerprint>,
}

/// What the plan proposes to do with a single file. Six cases in the
/// design: three automatic (`KeepAsIs`, `KeepAndRename`, `Delete`), two
/// user overrides (`UserKeep`, `UserDelete`), and the conflict-downgrade
/// case of §4.6, which is realized as a `KeepAsIs` carrying its own
/// reason rather than a distinct variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    KeepAsIs { reason: String },
    KeepAndRename { reason: String, new_stem: String },
    Delete { reason: String },
    UserKeep,
    UserDelete,
}

impl Action {
    /// True for every variant except `Delete`/`UserDelete`.
    pub fn is_keep(&self) -> bool {
        !matches!(self, Action::Delete { .. } | Action::UserDelete)
    }

    pub fn is_rename(&self) -> bool {
        matches!(self, Action::KeepAndRename { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Action::Delete { .. } | Action::UserDelete)
    }
}

/// A file as it appears inside a `FileGroup`, carrying its currently
/// effective action (override applied if present).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayFile {
    pub path: PathBuf,
    pub size: u64,
    pub action: Action,
}

/// Ordered display categories (§3). Ordinal order is the sort order of
/// the final `ScanResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupCategory {
    ContentDuplicates,
    LivePhotoPairToRepair,
    RedundantVersionsToDelete,
    PerfectlyPairedAndIgnored,
}

impl GroupCategory {
    pub fn ordinal(&self) -> u8 {
        match self {
            GroupCategory::ContentDuplicates => 1,
            GroupCategory::LivePhotoPairToRepair => 2,
            GroupCategory::RedundantVersionsToDelete => 3,
            GroupCategory::PerfectlyPairedAndIgnored => 4,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            GroupCategory::ContentDuplicates => "Content Duplicates",
            GroupCategory::LivePhotoPairToRepair => "Live Photo Pair to Repair",
            GroupCategory::RedundantVersionsToDelete => "Redundant Versions to Delete",
            GroupCategory::PerfectlyPairedAndIgnored => "Perfectly Paired & Ignored",
        }
    }
}

/// A set of files the Planner treats as candidates for mutual reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileGroup {
    pub group_name: String,
    pub category: GroupCategory,
    pub files: Vec<DisplayFile>,
}

/// Aggregate totals over a `ScanResult`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Totals {
    pub file_count: usize,
    pub group_count: usize,
    pub reclaimable_bytes: u64,
}

/// Per-file bookkeeping that lets `toggle_override` mutate a file's
/// effective action without re-running the Planner, per the side-table
/// design in §9.
#[derive(Debug, Clone)]
struct FileState {
    group_index: usize,
    slot_index: usize,
    automatic_action: Action,
    override_action: Option<Action>,
}

/// `{ groups, categories, totals }` plus the override side-table (§3, §9).
/// The side-table is a live-session concept and is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub groups: Vec<FileGroup>,
    pub categories: Vec<GroupCategory>,
    pub totals: Totals,
    #[serde(skip)]
    index: HashMap<PathBuf, FileState>,
}

impl ScanResult {
    pub fn new(groups: Vec<FileGroup>, categories: Vec<GroupCategory>) -> Self {
        let mut index = HashMap::new();
        let mut file_count = 0usize;
        let mut reclaimable_bytes = 0u64;

        for (group_index, group) in groups.iter().enumerate() {
            for (slot_index, file) in group.files.iter().enumerate() {
                file_count += 1;
                if file.action.is_delete() {
                    reclaimable_bytes += file.size;
                }
                index.insert(
                    file.path.clone(),
                    FileState {
                        group_index,
                        slot_index,
                        automatic_action: file.action.clone(),
                        override_action: None,
                    },
                );
            }
        }

        let totals = Totals {
            file_count,
            group_count: groups.len(),
            reclaimable_bytes,
        };

        Self {
            groups,
            categories,
            totals,
            index,
        }
    }

    /// Flips `path` between its original automatic action and the
    /// inverse user override, returning the new effective action.
    /// `KeepAndRename` is structural and never overridable: its current
    /// action is returned unchanged (§6, invariant 7).
    pub fn toggle_override(&mut self, path: &std::path::Path) -> Option<Action> {
        let state = self.index.get_mut(path)?;

        if state.automatic_action.is_rename() {
            return Some(state.automatic_action.clone());
        }

        let new_action = match &state.override_action {
            Some(_) => {
                state.override_action = None;
                state.automatic_action.clone()
            }
            None => {
                let inverse = if state.automatic_action.is_delete() {
                    Action::UserKeep
                } else {
                    Action::UserDelete
                };
                state.override_action = Some(inverse.clone());
                inverse
            }
        };

        let group_index = state.group_index;
        let slot_index = state.slot_index;
        self.groups[group_index].files[slot_index].action = new_action.clone();
        self.recompute_totals();
        Some(new_action)
    }

    fn recompute_totals(&mut self) {
        let mut reclaimable_bytes = 0u64;
        for group in &self.groups {
            for file in &group.files {
                if file.action.is_delete() {
                    reclaimable_bytes += file.size;
                }
            }
        }
        self.totals.reclaimable_bytes = reclaimable_bytes;
    }
}
