//! The four planning rules of §4.6, applied in order: content-duplicate
//! sweep, perfect-pair detection, size-variant/Live-Photo resolution,
//! and leftovers.

use super::types::{Action, DisplayFile, FileGroup, FileRecord, GroupCategory};
use crate::core::namegroup::group_by_canonical_name;
use crate::core::scanner::MediaKind;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// (a) Bucket by fingerprint; buckets of size >= 2 become Content
/// Duplicate groups. Returns the emitted groups and the set of paths
/// they consumed.
pub fn content_duplicate_sweep(
    records: &[FileRecord],
) -> (Vec<FileGroup>, std::collections::HashSet<std::path::PathBuf>) {
    let mut buckets: HashMap<[u8; 32], Vec<&FileRecord>> = HashMap::new();
    for record in records {
        if let Some(fingerprint) = &record.fingerprint {
            buckets
                .entry(*fingerprint.as_bytes())
                .or_default()
                .push(record);
        }
    }

    let mut groups = Vec::new();
    let mut consumed = std::collections::HashSet::new();

    let mut bucket_list: Vec<_> = buckets.into_iter().collect();
    bucket_list.sort_by_key(|(digest, _)| *digest);

    for (_, mut members) in bucket_list {
        if members.len() < 2 {
            continue;
        }

        members.sort_by(|a, b| {
            filename_len(a)
                .cmp(&filename_len(b))
                .then_with(|| a.path.cmp(&b.path))
        });

        let kept = members[0];
        let kept_name = file_name_string(kept);

        let mut files = vec![DisplayFile {
            path: kept.path.clone(),
            size: kept.size,
            action: Action::KeepAsIs {
                reason: "Best name among content duplicates".to_string(),
            },
        }];

        for dup in &members[1..] {
            files.push(DisplayFile {
                path: dup.path.clone(),
                size: dup.size,
                action: Action::Delete {
                    reason: format!("Content Duplicate of {kept_name}"),
                },
            });
        }

        for member in &members {
            consumed.insert(member.path.clone());
        }

        let fingerprint = kept.fingerprint.as_ref().expect("bucketed by fingerprint");
        groups.push(FileGroup {
            group_name: format!("Content Duplicates: {}", fingerprint.short_hex()),
            category: GroupCategory::ContentDuplicates,
            files,
        });
    }

    (groups, consumed)
}

/// (b) A perfect pair is exactly one image and one video, sharing an
/// *un-normalized* base name, found within a canonical-name bucket.
/// Observes `cancel` between name groups (§5); returns `None` if
/// cancellation was observed.
pub fn perfect_pair_detection<'a>(
    remaining: &[&'a FileRecord],
    cancel: &Arc<AtomicBool>,
) -> Option<(Vec<FileGroup>, std::collections::HashSet<std::path::PathBuf>)> {
    let items: Vec<&'a FileRecord> = remaining.to_vec();
    let by_canonical = group_by_canonical_name(items, |r| r.path.as_path(), cancel)?;

    let mut groups = Vec::new();
    let mut consumed = std::collections::HashSet::new();

    let mut keys: Vec<_> = by_canonical.keys().cloned().collect();
    keys.sort();

    for key in keys {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }

        let members = &by_canonical[&key];
        if members.len() != 2 {
            continue;
        }

        let images: Vec<_> = members.iter().copied().filter(|r| r.kind == MediaKind::Image).collect();
        let videos: Vec<_> = members.iter().copied().filter(|r| r.kind == MediaKind::Video).collect();

        if images.len() != 1 || videos.len() != 1 {
            continue;
        }

        if file_stem_string(images[0]) != file_stem_string(videos[0]) {
            continue;
        }

        let files = vec![
            DisplayFile {
                path: images[0].path.clone(),
                size: images[0].size,
                action: Action::KeepAsIs {
                    reason: "Perfectly Paired".to_string(),
                },
            },
            DisplayFile {
                path: videos[0].path.clone(),
                size: videos[0].size,
                action: Action::KeepAsIs {
                    reason: "Perfectly Paired".to_string(),
                },
            },
        ];

        consumed.insert(images[0].path.clone());
        consumed.insert(videos[0].path.clone());

        groups.push(FileGroup {
            group_name: format!("Perfectly Paired & Ignored: {key}"),
            category: GroupCategory::PerfectlyPairedAndIgnored,
            files,
        });
    }

    Some((groups, consumed))
}

/// (c) For every remaining name group, resolve size variants and, when
/// an image/video pair disagree on stem, the Live Photo rename.
/// Observes `cancel` between name groups (§5); returns `None` if
/// cancellation was observed.
pub fn size_variant_resolution<'a>(
    remaining: &[&'a FileRecord],
    cancel: &Arc<AtomicBool>,
) -> Option<Vec<FileGroup>> {
    let items: Vec<&'a FileRecord> = remaining.to_vec();
    let by_canonical = group_by_canonical_name(items, |r| r.path.as_path(), cancel)?;

    let mut keys: Vec<_> = by_canonical.keys().cloned().collect();
    keys.sort();

    let mut groups = Vec::new();

    for key in keys {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }

        let members = &by_canonical[&key];

        let mut images: Vec<_> = members.iter().copied().filter(|r| r.kind == MediaKind::Image).collect();
        let mut videos: Vec<_> = members.iter().copied().filter(|r| r.kind == MediaKind::Video).collect();

        images.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        videos.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));

        let mut files = Vec::new();
        let mut has_rename = false;
        let mut has_delete = false;

        let best_video = videos.first().copied();
        let best_image = images.first().copied();

        if let Some(bv) = best_video {
            files.push(DisplayFile {
                path: bv.path.clone(),
                size: bv.size,
                action: Action::KeepAsIs {
                    reason: "Largest Video".to_string(),
                },
            });
            for extra in &videos[1..] {
                has_delete = true;
                files.push(DisplayFile {
                    path: extra.path.clone(),
                    size: extra.size,
                    action: Action::Delete {
                        reason: "Smaller Video Version".to_string(),
                    },
                });
            }
        }

        if let Some(bi) = best_image {
            let action = match best_video {
                Some(bv) => {
                    let sv = file_stem_string(bv);
                    let si = file_stem_string(bi);
                    if si != sv {
                        has_rename = true;
                        Action::KeepAndRename {
                            reason: "Primary for Live Photo".to_string(),
                            new_stem: sv,
                        }
                    } else {
                        Action::KeepAsIs {
                            reason: "Primary for Live Photo".to_string(),
                        }
                    }
                }
                None => Action::KeepAsIs {
                    reason: "Largest Image".to_string(),
                },
            };
            files.push(DisplayFile {
                path: bi.path.clone(),
                size: bi.size,
                action,
            });
            for extra in &images[1..] {
                has_delete = true;
                files.push(DisplayFile {
                    path: extra.path.clone(),
                    size: extra.size,
                    action: Action::Delete {
                        reason: "Smaller Image Version".to_string(),
                    },
                });
            }
        }

        if has_rename {
            groups.push(FileGroup {
                group_name: format!("Live Photo Pair to Repair: {key}"),
                category: GroupCategory::LivePhotoPairToRepair,
                files,
            });
        } else if has_delete {
            groups.push(FileGroup {
                group_name: format!("Redundant Versions to Delete: {key}"),
                category: GroupCategory::RedundantVersionsToDelete,
                files,
            });
        }
        // Else: no actions in the group, so nothing is emitted (§4.6c).
    }

    Some(groups)
}

fn filename_len(record: &FileRecord) -> usize {
    file_name_string(record).len()
}

fn file_name_string(record: &FileRecord) -> String {
    record
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn file_stem_string(record: &FileRecord) -> String {
    record
        .path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}
