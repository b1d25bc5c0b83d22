//! Pipeline orchestration: the single cooperative task of §5 that drives
//! discovery, hashing, and planning end to end and returns a finished
//! `ScanResult`, or `ScanOutcome::Cancelled` if the cancellation flag was
//! observed at any checkpoint. No partial plan is ever exposed (§5, §7).

use crate::core::access::{acquire, AccessBroker, AccessToken, DirectAccessBroker};
use crate::core::hasher::hash_all;
use crate::core::planner::{FileRecord, Planner, ScanResult};
use crate::core::progress::ProgressManager;
use crate::core::scanner::DirectoryWalker;
use crate::error::MediaCleanupError;
use crate::events::{Event, EventSender, Phase, PipelineOutcome};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of a full scan attempt.
#[derive(Debug)]
pub enum ScanOutcome {
    Completed(ScanResult),
    Cancelled,
}

/// Configuration for a scan session. `worker_count` defaults to
/// `std::thread::available_parallelism()` when `None`, mirroring the
/// Parallel Hash Pool's own default (§4.5).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub root: PathBuf,
    pub worker_count: Option<usize>,
}

impl PipelineConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: None,
        }
    }
}

/// Builder for `Pipeline`, following the teacher's `PipelineBuilder`
/// idiom. The broker defaults to `DirectAccessBroker`; a platform
/// sandbox broker plugs in here without the pipeline knowing about it
/// (§4, Path Access Broker).
pub struct PipelineBuilder {
    config: PipelineConfig,
    broker: Arc<dyn AccessBroker>,
}

impl PipelineBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: PipelineConfig::new(root),
            broker: Arc::new(DirectAccessBroker),
        }
    }

    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = Some(count);
        self
    }

    pub fn broker(mut self, broker: Arc<dyn AccessBroker>) -> Self {
        self.broker = broker;
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            config: self.config,
            broker: self.broker,
        }
    }
}

/// Drives the scan-and-plan pipeline over a single root directory, and
/// applies the resulting plan via `execute`.
pub struct Pipeline {
    config: PipelineConfig,
    broker: Arc<dyn AccessBroker>,
}

impl Pipeline {
    pub fn builder(root: impl Into<PathBuf>) -> PipelineBuilder {
        PipelineBuilder::new(root)
    }

    /// Acquires scoped access to the root, then runs discovery, hashing,
    /// and planning in sequence. The returned `AccessToken` must be kept
    /// alive by the caller until any subsequent `execute()` call has
    /// completed, then dropped - the token releases access on `Drop`
    /// regardless of which exit path was taken (§5, §9).
    pub fn scan(
        &self,
        cancel: Arc<AtomicBool>,
        events: &EventSender,
    ) -> Result<(AccessToken, ScanOutcome), MediaCleanupError> {
        let token = acquire(&self.config.root, Arc::clone(&self.broker))?;
        let outcome = self.run_phases(token.root().to_path_buf(), &cancel, events)?;
        Ok((token, outcome))
    }

    fn run_phases(
        &self,
        root: PathBuf,
        cancel: &Arc<AtomicBool>,
        events: &EventSender,
    ) -> Result<ScanOutcome, MediaCleanupError> {
        let mut progress = ProgressManager::new(events.clone());

        // Phase 1: discovery.
        progress.start_phase(Phase::Discovery, 1);
        let walker = DirectoryWalker::new(Arc::clone(cancel));
        let discovered = walker.walk(&root, |error| {
            tracing::warn!(%error, "subtree skipped during discovery");
            events.send(Event::NonFatalError {
                phase: Phase::Discovery,
                message: error.to_string(),
            });
        });
        progress.update(1, format!("{} media files found", discovered.len()));

        if cancel.load(Ordering::Relaxed) {
            return Ok(self.cancelled(events));
        }

        // Phase 2: content hashing, bounded concurrency (§4.5). `hash_all`
        // invokes its progress callback from whichever rayon worker
        // thread finishes a file, so `progress` is moved behind a mutex
        // for the duration of this phase.
        progress.start_phase(Phase::Hashing, discovered.len() as u64);
        let total = discovered.len();
        let progress = std::sync::Mutex::new(progress);
        let hashed = hash_all(discovered, self.config.worker_count, Arc::clone(cancel), |done, _| {
            progress
                .lock()
                .expect("progress lock poisoned")
                .update(done as u64, format!("{done}/{total} hashed"));
        });
        let mut progress = progress.into_inner().expect("progress lock poisoned");

        if cancel.load(Ordering::Relaxed) {
            return Ok(self.cancelled(events));
        }

        let records: Vec<FileRecord> = hashed
            .into_iter()
            .map(|hashed_file| {
                let fingerprint = match hashed_file.fingerprint {
                    Ok(fingerprint) => Some(fingerprint),
                    Err(error) => {
                        tracing::warn!(path = %hashed_file.path.display(), %error, "fingerprinting failed, file excluded from duplicate detection");
                        events.send(Event::NonFatalError {
                            phase: Phase::Hashing,
                            message: error.to_string(),
                        });
                        None
                    }
                };
                FileRecord {
                    path: hashed_file.path,
                    size: hashed_file.size,
                    kind: hashed_file.kind,
                    fingerprint,
                }
            })
            .collect();

        // Phase 3: planning.
        progress.start_phase(Phase::Planning, 1);
        let plan = match Planner::plan_cancellable(records, cancel) {
            Some(plan) => plan,
            None => return Ok(self.cancelled(events)),
        };
        progress.update(1, "plan ready");

        // Phase 4: finalize.
        progress.start_phase(Phase::Finalize, 1);
        progress.update(1, "done");

        events.send(Event::Finished(PipelineOutcome::Completed {
            groups: plan.groups.len(),
            reclaimable_bytes: plan.totals.reclaimable_bytes,
        }));

        Ok(ScanOutcome::Completed(plan))
    }

    fn cancelled(&self, events: &EventSender) -> ScanOutcome {
        events.send(Event::Finished(PipelineOutcome::Cancelled));
        ScanOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str, bytes: &[u8]) {
        let mut file = File::create(dir.path().join(name)).unwrap();
        file.write_all(bytes).unwrap();
    }

    #[test]
    fn scan_empty_directory_yields_empty_plan() {
        let dir = TempDir::new().unwrap();
        let pipeline = Pipeline::builder(dir.path()).build();
        let (sender, _receiver) = EventChannel::new();

        let (_token, outcome) = pipeline.scan(Arc::new(AtomicBool::new(false)), &sender).unwrap();
        match outcome {
            ScanOutcome::Completed(plan) => assert!(plan.groups.is_empty()),
            ScanOutcome::Cancelled => panic!("expected completion"),
        }
    }

    #[test]
    fn scan_detects_content_duplicates_end_to_end() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "A.heic", b"x");
        touch(&dir, "A copy.heic", b"x");
        touch(&dir, "A (1).heic", b"x");

        let pipeline = Pipeline::builder(dir.path()).build();
        let (sender, _receiver) = EventChannel::new();

        let (_token, outcome) = pipeline.scan(Arc::new(AtomicBool::new(false)), &sender).unwrap();
        let plan = match outcome {
            ScanOutcome::Completed(plan) => plan,
            ScanOutcome::Cancelled => panic!("expected completion"),
        };

        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.totals.reclaimable_bytes, 2);
    }

    #[test]
    fn scan_missing_root_is_an_access_error() {
        let pipeline = Pipeline::builder("/nonexistent/path/12345").build();
        let (sender, _receiver) = EventChannel::new();

        let result = pipeline.scan(Arc::new(AtomicBool::new(false)), &sender);
        assert!(result.is_err());
    }

    #[test]
    fn scan_cancelled_before_start_exposes_no_plan() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "A.heic", b"x");

        let pipeline = Pipeline::builder(dir.path()).build();
        let (sender, _receiver) = EventChannel::new();

        let (_token, outcome) = pipeline.scan(Arc::new(AtomicBool::new(true)), &sender).unwrap();
        assert!(matches!(outcome, ScanOutcome::Cancelled));
    }

    #[test]
    fn execute_runs_against_a_completed_plan() {
        use crate::core::executor::PlanExecutor;

        let dir = TempDir::new().unwrap();
        touch(&dir, "A.heic", b"x");
        touch(&dir, "A copy.heic", b"x");

        let pipeline = Pipeline::builder(dir.path()).build();
        let (sender, _receiver) = EventChannel::new();

        let (token, outcome) = pipeline.scan(Arc::new(AtomicBool::new(false)), &sender).unwrap();
        let plan = match outcome {
            ScanOutcome::Completed(plan) => plan,
            ScanOutcome::Cancelled => panic!("expected completion"),
        };

        let report = PlanExecutor::execute(&plan);
        assert_eq!(report.deleted_ok, 1);
        drop(token);
    }
}
