//! # Name Normalizer & Name Grouper
//!
//! Canonicalizes a path's base name (§4.3) and groups files by that key
//! so the Planner can reason about size variants and Live Photo pairs
//! (§4.6c). Grouping runs a suspension checkpoint every 5,000 items so a
//! pipeline-scope cancellation check stays responsive on huge libraries
//! (§5).

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

const CHECKPOINT_INTERVAL: usize = 5_000;

// The bare digit-suffix branch is bounded to 1-2 digits so it only
// catches short copy counters ("A_2", "A 12"), not camera sequence
// numbers like "IMG_0002" that happen to end in an underscore + digits.
static VARIANT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:[ _-](?:copy|\d{1,2})| \(\d+\)|_v\d+)$").expect("static pattern is valid")
});

/// Returns the canonical base name used as a name-grouping key: the file
/// stem with at most one trailing variant marker (`copy`, ` (2)`, `_v3`,
/// a short trailing counter) stripped, case-insensitively. Only a single
/// marker is stripped; stacked markers (`X copy (2)_v3`) normalize one
/// step only (§9).
pub fn canonical_base_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    match VARIANT_MARKER.find(stem) {
        Some(m) => stem[..m.start()].to_string(),
        None => stem.to_string(),
    }
}

/// Groups `items` by the canonical base name of `key_of(item)`, checking
/// `cancel` every [`CHECKPOINT_INTERVAL`] items. Returns `None` if
/// cancellation was observed; the caller must treat that the same as a
/// pipeline-wide cancellation (no partial result exposed).
pub fn group_by_canonical_name<T>(
    items: Vec<T>,
    key_of: impl Fn(&T) -> &Path,
    cancel: &Arc<AtomicBool>,
) -> Option<HashMap<String, Vec<T>>> {
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();

    for (i, item) in items.into_iter().enumerate() {
        if i % CHECKPOINT_INTERVAL == 0 && cancel.load(Ordering::Relaxed) {
            return None;
        }
        let key = canonical_base_name(key_of(&item));
        groups.entry(key).or_default().push(item);
    }

    Some(groups)
}
