//! # Media Cleanup
//!
//! Scans a media directory for content-identical duplicates, Live Photo
//! pairings, and redundant size variants, and produces a cleaning plan for
//! review - nothing is deleted or renamed until the plan is executed.
//!
//! ## Core Philosophy
//! - **Never auto-delete** - every action is proposed first, applied only on request
//! - **Show WHY** - every grouped file carries the reason it was grouped
//! - **No partial plans** - cancellation never exposes a half-finished plan
//!
//! ## Architecture
//! The library is split into a core engine (GUI-agnostic) and presentation layers:
//! - `core` - The scan-and-plan engine
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types
//!
//! The `media-cleanup` binary (`src/main.rs`, `src/cli`) is a thin
//! command-line demonstration shell built on top of this library.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{MediaCleanupError, Result};
