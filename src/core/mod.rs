//! # Core Module
//!
//! The GUI-agnostic scan-and-plan engine.
//!
//! ## Modules
//! - `access` - Scoped acquire/release of read-write access to the root directory
//! - `scanner` - Walks the directory and classifies media
//! - `hasher` - Computes content fingerprints (plus an unwired perceptual-hash experiment)
//! - `namegroup` - Canonicalizes base names and groups files by them
//! - `planner` - Applies the keep/rename/delete policy and builds a `ScanResult`
//! - `progress` - Phase-weighted progress and ETA estimation
//! - `executor` - Applies a plan's deletes and renames
//! - `pipeline` - Orchestrates scan() end to end

pub mod access;
pub mod executor;
pub mod hasher;
pub mod namegroup;
pub mod pipeline;
pub mod planner;
pub mod progress;
pub mod scanner;

// Re-export commonly used types
pub use access::{AccessBroker, AccessToken, DirectAccessBroker};
pub use executor::{ExecutionReport, PlanExecutor};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineConfig, ScanOutcome};
pub use planner::{Action, FileGroup, FileRecord, GroupCategory, Planner, ScanResult};
pub use progress::ProgressManager;
pub use scanner::{DiscoveredPath, MediaKind};
