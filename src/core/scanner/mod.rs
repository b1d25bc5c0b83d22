//! # Scanner Module
//!
//! Discovers media files in a directory tree (the Directory Walker, §4.1)
//! and classifies each as `image` or `video` by extension (the Media
//! Classifier, §4.2). Non-media is discarded before it ever becomes a
//! `FileRecord`.
//!
//! ## Supported Formats
//! - Images: HEIC, JPEG, PNG, TIFF, BMP
//! - Videos: MOV, MP4, M4V, AVI, MKV

mod classifier;
mod walker;

pub use classifier::classify;
pub use walker::DirectoryWalker;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Coarse classification of a discovered media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

/// A media file found by the walker, not yet fingerprinted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredPath {
    pub path: PathBuf,
    pub size: u64,
    pub kind: MediaKind,
}
