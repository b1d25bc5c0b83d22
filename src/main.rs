//! # media-cleanup CLI
//!
//! Command-line demonstration shell for the media cleanup core.
//!
//! ## Usage
//! ```bash
//! media-cleanup scan ~/Photos
//! media-cleanup scan ~/Photos --verbose --output json
//! ```

mod cli;

use media_cleanup_core::Result;

fn main() -> Result<()> {
    cli::run()
}
