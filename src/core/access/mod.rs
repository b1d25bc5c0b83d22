//! # Path Access Broker
//!
//! Acquires and releases scoped read/write access to the chosen directory.
//! The core treats this as an opaque `acquire()` / `release()` pair; the
//! real sandbox-entitlement plumbing (macOS security-scoped bookmarks,
//! Windows broker processes, etc.) is an external collaborator and out of
//! scope here - this is the trait seam it would plug into.
//!
//! The token is held for the full duration of both scan and execute, and
//! released on every exit path (completion, error, or cancellation) via
//! `Drop`, so callers cannot forget to release it.

use crate::error::AccessError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A scoped handle to read/write access on a directory. Released when
/// dropped, regardless of which path out of `scan`/`execute` is taken.
pub struct AccessToken {
    root: PathBuf,
    broker: Arc<dyn AccessBroker>,
}

impl AccessToken {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.broker.release(&self.root);
    }
}

/// Implement this trait to plug in a platform-specific access broker
/// (sandbox entitlement, bookmark resolution, permission prompt, ...).
/// The default `DirectAccessBroker` simply checks the path exists and is
/// a directory, for platforms with no additional sandboxing model.
pub trait AccessBroker: Send + Sync {
    /// Acquire access to `root`. Must be cheap to call repeatedly with
    /// the same root (idempotent) and must fail with `AccessError` rather
    /// than panic.
    fn acquire(&self, root: &Path) -> Result<(), AccessError>;

    /// Release previously acquired access. Called exactly once per
    /// successful `acquire`, on every exit path.
    fn release(&self, root: &Path);
}

/// Acquire a scoped token using the given broker. The token releases
/// access automatically when it goes out of scope.
pub fn acquire(
    root: &Path,
    broker: Arc<dyn AccessBroker>,
) -> Result<AccessToken, AccessError> {
    broker.acquire(root)?;
    Ok(AccessToken {
        root: root.to_path_buf(),
        broker,
    })
}

/// A no-op broker for platforms without a sandboxing model: access is
/// granted as long as the path exists and is a directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectAccessBroker;

impl AccessBroker for DirectAccessBroker {
    fn acquire(&self, root: &Path) -> Result<(), AccessError> {
        if !root.is_dir() {
            return Err(AccessError::NotADirectory {
                path: root.to_path_buf(),
            });
        }
        Ok(())
    }

    fn release(&self, _root: &Path) {
        // Nothing to release - no handle was taken out.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_succeeds_for_existing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let token = acquire(temp_dir.path(), Arc::new(DirectAccessBroker));
        assert!(token.is_ok());
    }

    #[test]
    fn acquire_fails_for_missing_directory() {
        let result = acquire(
            std::path::Path::new("/nonexistent/path/12345"),
            Arc::new(DirectAccessBroker),
        );
        assert!(result.is_err());
    }

    #[test]
    fn acquire_fails_for_file_not_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("not_a_dir.txt");
        std::fs::write(&file_path, b"hello").unwrap();

        let result = acquire(&file_path, Arc::new(DirectAccessBroker));
        assert!(result.is_err());
    }

    #[test]
    fn token_exposes_root() {
        let temp_dir = TempDir::new().unwrap();
        let token = acquire(temp_dir.path(), Arc::new(DirectAccessBroker)).unwrap();
        assert_eq!(token.root(), temp_dir.path());
    }
}
