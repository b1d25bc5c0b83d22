//! # Pipeline Module
//!
//! Orchestrates the full scan-and-plan workflow as the single cooperative
//! pipeline-scope task of §5.
//!
//! ## Pipeline Phases
//! 1. **Discovery** - Walk the root and classify media (§4.1, §4.2)
//! 2. **Hashing** - Content-fingerprint every file with bounded concurrency (§4.4, §4.5)
//! 3. **Planning** - Group and apply keep/rename/delete policy (§4.6)
//! 4. **Finalize** - Emit the finished `ScanResult`
//!
//! ## Parallelism
//! Uses rayon for bounded-concurrency hashing across hardware threads;
//! everything else runs on the single pipeline-scope task.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, ScanOutcome};
