//! # Parallel Hash Pool
//!
//! Runs the Chunk Hasher over a batch of discovered files with bounded
//! concurrency (§4.5). The worker count defaults to
//! `std::thread::available_parallelism()` so the pool saturates the
//! machine without oversubscribing it; it never spawns one thread per
//! file.
//!
//! Progress is reported at most once per 100ms (throttled) rather than
//! once per file, so a directory of thousands of small photos doesn't
//! flood the progress channel.

use super::chunk::{fingerprint_file, Fingerprint};
use crate::core::scanner::DiscoveredPath;
use crate::error::WalkError;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One file's hashing outcome: a fingerprint, or an error that excludes
/// it from duplicate detection without aborting the batch (§4.4).
pub struct HashedFile {
    pub path: PathBuf,
    pub size: u64,
    pub fingerprint: Result<Fingerprint, WalkError>,
}

/// Minimum interval between progress callback invocations.
const PROGRESS_THROTTLE: Duration = Duration::from_millis(100);

/// Hashes every entry in `files` using a worker pool bounded by
/// `worker_count` (falls back to `available_parallelism()` if `None`).
/// Checks `cancel` between dispatch batches; files already queued to a
/// worker still complete, but no new work is started once the flag is
/// observed set. `on_progress(done, total)` is called at most once per
/// `PROGRESS_THROTTLE`, plus once unconditionally at completion.
pub fn hash_all(
    files: Vec<DiscoveredPath>,
    worker_count: Option<usize>,
    cancel: Arc<AtomicBool>,
    on_progress: impl Fn(usize, usize) + Send + Sync,
) -> Vec<HashedFile> {
    let total = files.len();
    if total == 0 {
        return Vec::new();
    }

    let workers = worker_count
        .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1)
        .max(1);

    let pool = build_pool(workers);

    let done = AtomicUsize::new(0);
    let last_report = Mutex::new(Instant::now() - PROGRESS_THROTTLE);

    let report = |count: usize| {
        let mut guard = last_report.lock().expect("progress lock poisoned");
        if count == total || guard.elapsed() >= PROGRESS_THROTTLE {
            on_progress(count, total);
            *guard = Instant::now();
        }
    };

    let run = || {
        files
            .into_par_iter()
            .map(|discovered| {
                let fingerprint = if cancel.load(Ordering::Relaxed) {
                    Err(WalkError::Subtree {
                        subtree: discovered.path.clone(),
                        cause: std::io::Error::new(std::io::ErrorKind::Interrupted, "cancelled"),
                    })
                } else {
                    fingerprint_file(&discovered.path)
                };

                let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                report(count);

                HashedFile {
                    path: discovered.path,
                    size: discovered.size,
                    fingerprint,
                }
            })
            .collect()
    };

    match pool {
        Some(pool) => pool.install(run),
        None => run(),
    }
}

fn build_pool(workers: usize) -> Option<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .ok()
}
