//! Directory walking implementation using walkdir.
//!
//! Produces a lazy, cancellable sequence of discovered media files,
//! skipping hidden entries and directory packages. Errors enumerating a
//! subtree are logged and the subtree is skipped; they never fail the
//! scan (§4.1).

use super::classifier::{classify, is_hidden};
use super::DiscoveredPath;
use crate::error::WalkError;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use walkdir::{DirEntry, WalkDir};

/// Walks a root directory, yielding discovered media files one at a time.
pub struct DirectoryWalker {
    cancel: Arc<AtomicBool>,
}

impl DirectoryWalker {
    pub fn new(cancel: Arc<AtomicBool>) -> Self {
        Self { cancel }
    }

    /// Walk `root`, invoking `on_error` for any non-fatal subtree error
    /// and returning every discovered media file found before
    /// cancellation (if any) was observed.
    pub fn walk(
        &self,
        root: &Path,
        mut on_error: impl FnMut(WalkError),
    ) -> Vec<DiscoveredPath> {
        let mut discovered = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !should_skip_descent(entry));

        for entry_result in walker {
            if self.cancel.load(Ordering::Relaxed) {
                break;
            }

            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if is_hidden(&entry.file_name().to_string_lossy()) {
                        continue;
                    }

                    let Some(kind) = classify(path) else {
                        continue;
                    };

                    match entry.metadata() {
                        Ok(metadata) => discovered.push(DiscoveredPath {
                            path: path.to_path_buf(),
                            size: metadata.len(),
                            kind,
                        }),
                        Err(e) => on_error(WalkError::Io {
                            path: path.to_path_buf(),
                            cause: e.into_io_error().unwrap_or_else(|| {
                                std::io::Error::new(std::io::ErrorKind::Other, "metadata error")
                            }),
                        }),
                    }
                }
                Err(e) => {
                    let subtree = e.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    if e.io_error().map(|io| io.kind()) == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        on_error(WalkError::PermissionDenied { path: subtree });
                    } else {
                        on_error(WalkError::Subtree {
                            subtree,
                            cause: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                        });
                    }
                }
            }
        }

        discovered
    }
}

/// True if `entry` is a directory that should not be descended into:
/// hidden directories, or directory "packages" (a directory whose own
/// name carries a file extension, e.g. `.photoslibrary` bundles).
fn should_skip_descent(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    if !entry.file_type().is_dir() {
        return false;
    }

    let Some(name) = entry.file_name().to_str() else {
        return false;
    };

    if is_hidden(name) {
        return true;
    }

    Path::new(name).extension().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(path: &Path, bytes: &[u8]) {
        let mut file = File::create(path).unwrap();
        file.write_all(bytes).unwrap();
    }

    #[test]
    fn walk_empty_directory_finds_nothing() {
        let dir = TempDir::new().unwrap();
        let walker = DirectoryWalker::new(Arc::new(AtomicBool::new(false)));
        let found = walker.walk(dir.path(), |_| {});
        assert!(found.is_empty());
    }

    #[test]
    fn walk_finds_media_and_skips_other_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a.heic"), b"x");
        touch(&dir.path().join("b.mov"), b"y");
        touch(&dir.path().join("notes.txt"), b"z");

        let walker = DirectoryWalker::new(Arc::new(AtomicBool::new(false)));
        let found = walker.walk(dir.path(), |_| {});

        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|f| f.path.ends_with("a.heic")));
        assert!(found.iter().any(|f| f.path.ends_with("b.mov")));
    }

    #[test]
    fn walk_skips_hidden_files_and_directories() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join(".hidden.heic"), b"x");
        fs::create_dir(dir.path().join(".hidden_dir")).unwrap();
        touch(&dir.path().join(".hidden_dir/inner.heic"), b"x");

        let walker = DirectoryWalker::new(Arc::new(AtomicBool::new(false)));
        let found = walker.walk(dir.path(), |_| {});

        assert!(found.is_empty());
    }

    #[test]
    fn walk_skips_package_interiors() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Library.photoslibrary")).unwrap();
        touch(
            &dir.path().join("Library.photoslibrary/masters.heic"),
            b"x",
        );

        let walker = DirectoryWalker::new(Arc::new(AtomicBool::new(false)));
        let found = walker.walk(dir.path(), |_| {});

        assert!(found.is_empty());
    }

    #[test]
    fn walk_traverses_nested_directories() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("album");
        fs::create_dir(&subdir).unwrap();
        touch(&dir.path().join("root.jpg"), b"x");
        touch(&subdir.join("nested.jpg"), b"y");

        let walker = DirectoryWalker::new(Arc::new(AtomicBool::new(false)));
        let found = walker.walk(dir.path(), |_| {});

        assert_eq!(found.len(), 2);
    }

    #[test]
    fn walk_stops_when_cancelled() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            touch(&dir.path().join(format!("img{i}.jpg")), b"x");
        }

        let cancel = Arc::new(AtomicBool::new(true));
        let walker = DirectoryWalker::new(cancel);
        let found = walker.walk(dir.path(), |_| {});

        assert!(found.is_empty());
    }

    #[test]
    fn walk_reports_nonexistent_root_as_error() {
        let walker = DirectoryWalker::new(Arc::new(AtomicBool::new(false)));
        let mut errors = Vec::new();
        let found = walker.walk(Path::new("/nonexistent/path/12345"), |e| errors.push(e));

        assert!(found.is_empty());
        assert!(!errors.is_empty());
    }
}
