//! # Planner
//!
//! Applies the four rules of §4.6 to a batch of fingerprinted
//! `FileRecord`s and assembles a `ScanResult`: content-duplicate sweep,
//! perfect-pair detection, size-variant/Live-Photo resolution, and
//! leftovers, followed by a deterministic sort and a rename-collision
//! safety pass.

mod rules;
mod types;

pub use types::{Action, DisplayFile, FileGroup, FileRecord, GroupCategory, ScanResult, Totals};

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Synthesizes plans from fingerprinted file records. Stateless: all
/// state lives in the `ScanResult` it returns.
pub struct Planner;

impl Planner {
    /// Runs rules (a)-(d) over `records` and returns the finished,
    /// sorted, collision-safe `ScanResult`. Never cancels.
    pub fn plan(records: Vec<FileRecord>) -> ScanResult {
        Self::plan_cancellable(records, &Arc::new(AtomicBool::new(false)))
            .expect("a cancel flag that is never set cannot cancel planning")
    }

    /// As `plan`, but observes `cancel` between name groups during rules
    /// (b) and (c) (§5: "by the Planner between groups"). Returns `None`
    /// if cancellation was observed - no partial plan is ever exposed.
    pub fn plan_cancellable(records: Vec<FileRecord>, cancel: &Arc<AtomicBool>) -> Option<ScanResult> {
        let (mut groups, consumed_a) = rules::content_duplicate_sweep(&records);

        let remaining_after_a: Vec<&FileRecord> = records
            .iter()
            .filter(|r| !consumed_a.contains(&r.path))
            .collect();

        let (pair_groups, consumed_b) = rules::perfect_pair_detection(&remaining_after_a, cancel)?;
        groups.extend(pair_groups);

        let remaining_after_b: Vec<&FileRecord> = remaining_after_a
            .into_iter()
            .filter(|r| !consumed_b.contains(&r.path))
            .collect();

        // (d) Leftovers never placed in a group are implicitly KeepAsIs
        // and simply never appear in `groups` - no group is emitted for
        // them, per §4.6d.
        let variant_groups = rules::size_variant_resolution(&remaining_after_b, cancel)?;
        groups.extend(variant_groups);

        downgrade_colliding_renames(&records, &mut groups);
        sort_groups(&mut groups);

        let categories = vec![
            GroupCategory::ContentDuplicates,
            GroupCategory::LivePhotoPairToRepair,
            GroupCategory::RedundantVersionsToDelete,
            GroupCategory::PerfectlyPairedAndIgnored,
        ];

        Some(ScanResult::new(groups, categories))
    }
}

/// Before returning, verify no two `KeepAndRename` destinations collide
/// with each other or with an existing kept file - including leftover
/// files that were never placed in a displayed group (§4.6d still keeps
/// them at their original path). Conflicts are downgraded to
/// `KeepAsIs("Rename skipped: target exists")`.
fn downgrade_colliding_renames(all_records: &[FileRecord], groups: &mut [FileGroup]) {
    let grouped_action: std::collections::HashMap<&std::path::Path, &Action> = groups
        .iter()
        .flat_map(|g| g.files.iter())
        .map(|f| (f.path.as_path(), &f.action))
        .collect();

    // Every record's final resting path, absent any rename conflicts:
    // deleted files vacate their path, renamed files occupy their
    // destination, everything else (including ungrouped leftovers)
    // keeps its original path. A destination claimed by more than one
    // original path is a collision.
    let mut owners: std::collections::HashMap<PathBuf, usize> = std::collections::HashMap::new();
    for record in all_records {
        let final_path = match grouped_action.get(record.path.as_path()) {
            Some(Action::Delete { .. }) => continue,
            Some(Action::KeepAndRename { new_stem, .. }) => {
                rename_destination(&record.path, new_stem)
            }
            _ => record.path.clone(),
        };
        *owners.entry(final_path).or_insert(0) += 1;
    }

    for group in groups.iter_mut() {
        for file in &mut group.files {
            if let Action::KeepAndRename { new_stem, .. } = &file.action {
                let dest = rename_destination(&file.path, new_stem);
                if owners.get(&dest).copied().unwrap_or(0) > 1 {
                    file.action = Action::KeepAsIs {
                        reason: "Rename skipped: target exists".to_string(),
                    };
                }
            }
        }
    }
}

fn rename_destination(path: &std::path::Path, new_stem: &str) -> PathBuf {
    let ext = path.extension().and_then(|e| e.to_str());
    let file_name = match ext {
        Some(ext) => format!("{new_stem}.{ext}"),
        None => new_stem.to_string(),
    };
    path.with_file_name(file_name)
}

/// Sort groups by category ordinal, then lexicographically
/// (case-insensitive) by the group name's suffix after its category
/// prefix.
fn sort_groups(groups: &mut [FileGroup]) {
    groups.sort_by(|a, b| {
        a.category
            .ordinal()
            .cmp(&b.category.ordinal())
            .then_with(|| {
                group_name_suffix(a)
                    .to_lowercase()
                    .cmp(&group_name_suffix(b).to_lowercase())
            })
    });
}

fn group_name_suffix(group: &FileGroup) -> String {
    group
        .group_name
        .strip_prefix(group.category.prefix())
        .map(|s| s.trim_start_matches(':').trim().to_string())
        .unwrap_or_else(|| group.group_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hasher::fingerprint_file;
    use crate::core::scanner::MediaKind;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn record(dir: &TempDir, name: &str, bytes: &[u8], kind: MediaKind) -> FileRecord {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        let fingerprint = fingerprint_file(&path).ok();
        FileRecord {
            path,
            size: bytes.len() as u64,
            kind,
            fingerprint,
        }
    }

    #[test]
    fn full_pipeline_s1_content_duplicates() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(&dir, "A.heic", b"x", MediaKind::Image),
            record(&dir, "A copy.heic", b"x", MediaKind::Image),
            record(&dir, "A (1).heic", b"x", MediaKind::Image),
        ];

        let result = Planner::plan(records);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].category, GroupCategory::ContentDuplicates);
        assert_eq!(result.totals.reclaimable_bytes, 2); // two 1-byte deletes
    }

    #[test]
    fn no_total_wipe_invariant_holds() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(&dir, "A.heic", b"x", MediaKind::Image),
            record(&dir, "A copy.heic", b"x", MediaKind::Image),
        ];
        let result = Planner::plan(records);
        for group in &result.groups {
            assert!(group.files.iter().any(|f| f.action.is_keep()));
        }
    }

    #[test]
    fn categories_are_sorted_by_ordinal() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(&dir, "B.jpg", &vec![0u8; 5], MediaKind::Image),
            record(&dir, "B (1).jpg", &vec![1u8; 2], MediaKind::Image),
            record(&dir, "X.heic", b"dup-x", MediaKind::Image),
            record(&dir, "X copy.heic", b"dup-x", MediaKind::Image),
        ];
        let result = Planner::plan(records);

        let ordinals: Vec<u8> = result.groups.iter().map(|g| g.category.ordinal()).collect();
        let mut sorted = ordinals.clone();
        sorted.sort();
        assert_eq!(ordinals, sorted);
    }

    #[test]
    fn toggle_override_is_idempotent_in_pairs() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(&dir, "B.jpg", &vec![0u8; 5], MediaKind::Image),
            record(&dir, "B (1).jpg", &vec![1u8; 2], MediaKind::Image),
        ];
        let mut result = Planner::plan(records);

        let deleted_path = result.groups[0]
            .files
            .iter()
            .find(|f| f.action.is_delete())
            .unwrap()
            .path
            .clone();

        let original = result
            .groups
            .iter()
            .flat_map(|g| &g.files)
            .find(|f| f.path == deleted_path)
            .unwrap()
            .action
            .clone();

        result.toggle_override(&deleted_path);
        result.toggle_override(&deleted_path);

        let restored = result
            .groups
            .iter()
            .flat_map(|g| &g.files)
            .find(|f| f.path == deleted_path)
            .unwrap()
            .action
            .clone();

        assert_eq!(original, restored);
    }

    #[test]
    fn keep_and_rename_is_not_overridable() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            record(&dir, "IMG_0002.heic", &vec![0u8; 3], MediaKind::Image),
            record(&dir, "IMG_0002 copy.mov", &vec![0u8; 8], MediaKind::Video),
        ];
        let mut result = Planner::plan(records);

        let image_path = result
            .groups
            .iter()
            .flat_map(|g| &g.files)
            .find(|f| f.action.is_rename())
            .unwrap()
            .path
            .clone();

        let before = result
            .groups
            .iter()
            .flat_map(|g| &g.files)
            .find(|f| f.path == image_path)
            .unwrap()
            .action
            .clone();

        let toggled = result.toggle_override(&image_path).unwrap();
        assert_eq!(toggled, before);
    }

    #[test]
    fn rename_collision_downgrades_to_keep_as_is() {
        // Exercises the safety-net pass of §4.6 directly: the grouping
        // rules never produce two renames to the same destination from
        // *this* algorithm's own output, but the pass still guards
        // against a rename landing on a path already kept by another
        // file record.
        let dir = TempDir::new().unwrap();
        let renaming_image = record(&dir, "A.heic", &vec![0u8; 3], MediaKind::Image);
        let blocker = record(&dir, "A_v1.heic", &vec![0u8; 3], MediaKind::Image);

        let all_records = vec![renaming_image.clone(), blocker.clone()];

        let mut groups = vec![FileGroup {
            group_name: "Live Photo Pair to Repair: A".to_string(),
            category: GroupCategory::LivePhotoPairToRepair,
            files: vec![DisplayFile {
                path: renaming_image.path.clone(),
                size: renaming_image.size,
                action: Action::KeepAndRename {
                    reason: "Primary for Live Photo".to_string(),
                    new_stem: "A_v1".to_string(),
                },
            }],
        }];

        downgrade_colliding_renames(&all_records, &mut groups);

        let downgraded = groups[0]
            .files
            .iter()
            .find(|f| f.path == renaming_image.path)
            .unwrap();

        assert!(matches!(
            &downgraded.action,
            Action::KeepAsIs { reason } if reason == "Rename skipped: target exists"
        ));
    }

    #[test]
    fn non_colliding_rename_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let renaming_image = record(&dir, "A.heic", &vec![0u8; 3], MediaKind::Image);
        let all_records = vec![renaming_image.clone()];

        let mut groups = vec![FileGroup {
            group_name: "Live Photo Pair to Repair: A".to_string(),
            category: GroupCategory::LivePhotoPairToRepair,
            files: vec![DisplayFile {
                path: renaming_image.path.clone(),
                size: renaming_image.size,
                action: Action::KeepAndRename {
                    reason: "Primary for Live Photo".to_string(),
                    new_stem: "A_v1".to_string(),
                },
            }],
        }];

        downgrade_colliding_renames(&all_records, &mut groups);

        assert!(groups[0].files[0].action.is_rename());
    }
}
