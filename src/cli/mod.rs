//! # CLI Module
//!
//! Command-line demonstration shell for the media cleanup core.
//!
//! ## Usage
//! ```bash
//! # Scan a directory and print the proposed plan
//! media-cleanup scan ~/Photos
//!
//! # Apply the plan (deletes, then renames) after scanning
//! media-cleanup scan ~/Photos --apply
//!
//! # JSON output, for scripting or a future GUI
//! media-cleanup scan ~/Photos --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_cleanup_core::core::{Pipeline, PlanExecutor, ScanOutcome, ScanResult};
use media_cleanup_core::error::Result;
use media_cleanup_core::events::{Event, EventChannel};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Media Cleanup - find content duplicates, Live Photo mismatches, and
/// redundant size variants, and propose a plan before touching anything.
#[derive(Parser, Debug)]
#[command(name = "media-cleanup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and propose a cleaning plan
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Number of hashing worker threads (defaults to available parallelism)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Apply the plan immediately after scanning (deletes, then renames)
        #[arg(long)]
        apply: bool,

        /// Verbose per-file output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output: one path per line, the ones the plan would delete
    Minimal,
}

/// Run the CLI.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            workers,
            output,
            apply,
            verbose,
        } => run_scan(path, workers, output, apply, verbose),
    }
}

fn run_scan(
    path: PathBuf,
    workers: Option<usize>,
    output: OutputFormat,
    apply: bool,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Media Cleanup").bold().cyan(),
            style(env!("CARGO_PKG_VERSION")).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut builder = Pipeline::builder(&path);
    if let Some(workers) = workers {
        builder = builder.worker_count(workers);
    }
    let pipeline = builder.build();

    let (sender, receiver) = EventChannel::new();

    let progress = if matches!(output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Progress(state) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_length(state.total.max(1));
                        pb.set_position(state.processed);
                        let eta = state
                            .eta
                            .map(|d| format!("{:.0}s left", d.as_secs_f64()))
                            .unwrap_or_default();
                        pb.set_message(format!("{}: {} {eta}", state.phase, state.detail));
                    }
                }
                Event::NonFatalError { phase, message } => {
                    if verbose {
                        eprintln!("[{phase}] {message}");
                    }
                }
                Event::Finished(_) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
            }
        }
    });

    let cancel = Arc::new(AtomicBool::new(false));
    let (token, outcome) = pipeline.scan(cancel, &sender)?;

    drop(sender);
    event_thread.join().ok();

    let plan = match outcome {
        ScanOutcome::Completed(plan) => plan,
        ScanOutcome::Cancelled => {
            term.write_line(&style("Scan cancelled.").yellow().to_string())
                .ok();
            return Ok(());
        }
    };

    match output {
        OutputFormat::Pretty => print_pretty_results(&term, &plan, verbose),
        OutputFormat::Json => print_json_results(&plan),
        OutputFormat::Minimal => print_minimal_results(&plan),
    }

    if apply {
        let report = PlanExecutor::execute(&plan);
        term.write_line("").ok();
        term.write_line(&format!(
            "{} {} deleted, {} renamed, {} failures",
            style("Applied:").bold(),
            style(report.deleted_ok).green(),
            style(report.renamed_ok).green(),
            style(report.deleted_failed + report.renamed_failed).red()
        ))
        .ok();
        for (path, reason) in &report.failures {
            term.write_line(&format!("  {}: {}", path.display(), reason))
                .ok();
        }
    }

    // Held for the full scan+execute lifetime; dropping releases access.
    drop(token);

    Ok(())
}

fn print_pretty_results(term: &Term, plan: &ScanResult, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files considered",
        style(plan.totals.file_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} groups found",
        style(plan.totals.group_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} potential space savings",
        style(format_bytes(plan.totals.reclaimable_bytes)).yellow()
    ))
    .ok();
    term.write_line("").ok();

    if plan.groups.is_empty() {
        term.write_line(&format!("  {} Nothing to clean up!", style("🎉").green()))
            .ok();
        return;
    }

    for group in &plan.groups {
        term.write_line(&format!(
            "{} ({} files)",
            style(&group.group_name).bold().underlined(),
            group.files.len()
        ))
        .ok();

        for file in &group.files {
            let (marker, label) = match &file.action {
                media_cleanup_core::core::Action::KeepAsIs { reason } => {
                    (style("★").green().to_string(), reason.clone())
                }
                media_cleanup_core::core::Action::KeepAndRename { reason, new_stem } => (
                    style("→").cyan().to_string(),
                    format!("{reason} (rename to {new_stem})"),
                ),
                media_cleanup_core::core::Action::Delete { reason } => {
                    (style("✗").red().to_string(), reason.clone())
                }
                media_cleanup_core::core::Action::UserKeep => {
                    (style("★").green().to_string(), "Kept by user override".to_string())
                }
                media_cleanup_core::core::Action::UserDelete => {
                    (style("✗").red().to_string(), "Deleted by user override".to_string())
                }
            };

            term.write_line(&format!("    {} {}", marker, file.path.display()))
                .ok();
            if verbose {
                term.write_line(&format!("      {}", style(label).dim()))
                    .ok();
            }
        }

        term.write_line("").ok();
    }

    term.write_line(&format!(
        "{}",
        style("Nothing is deleted or renamed until you pass --apply.").dim()
    ))
    .ok();
}

fn print_json_results(plan: &ScanResult) {
    println!("{}", serde_json::to_string_pretty(plan).unwrap());
}

fn print_minimal_results(plan: &ScanResult) {
    for group in &plan.groups {
        for file in &group.files {
            if file.action.is_delete() {
                println!("{}", file.path.display());
            }
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
