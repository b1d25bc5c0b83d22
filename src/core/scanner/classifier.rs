//! Media classification by file extension.

use super::MediaKind;
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["heic", "jpg", "jpeg", "png", "tiff", "bmp"];
const VIDEO_EXTENSIONS: &[&str] = &["mov", "mp4", "m4v", "avi", "mkv"];

/// Classify a path as `image`, `video`, or neither, from its extension
/// alone (case-insensitive). Non-media paths are discarded by the
/// caller, never turned into a `FileRecord`.
pub fn classify(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// True if the file name (not the full path) starts with `.`, i.e. is a
/// hidden entry by Unix convention.
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
