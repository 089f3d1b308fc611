use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sigscan::prelude::*;

#[derive(Parser)]
#[command(name = "sigscan")]
#[command(about = "Find PDF and JPEG files by signature and log their hashes to CSV", long_about = None)]
struct Cli {
    /// Directory to scan
    directory: PathBuf,

    /// CSV file to append matches to (created if missing)
    #[arg(short, long, default_value = "signatures.csv")]
    output: PathBuf,

    /// Include subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Follow symbolic links while walking
    #[arg(long)]
    follow_links: bool,

    /// Digest recorded for each match
    #[arg(long, value_enum, default_value_t = HashArg::Md5)]
    hash: HashArg,

    /// Number of worker threads; more than one inspects files in parallel
    #[arg(short, long)]
    workers: Option<usize>,

    /// Also write a human-readable report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Run in batch mode (no progress spinner)
    #[arg(long)]
    batch: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum HashArg {
    /// MD5, 32 hex characters
    Md5,
    /// SHA-256, 64 hex characters
    Sha256,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Md5 => HashAlgorithm::Md5,
            HashArg::Sha256 => HashAlgorithm::Sha256,
        }
    }
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let control = ScanControl::default();

    let stop_flag = control.stop.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutdown requested. Finishing current file...");
        stop_flag.store(true, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    if let Some(workers) = cli.workers {
        rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build_global()
            .context("Failed to build thread pool")?;
    }

    let root = validate_directory(&cli.directory)?;
    let options = ScanOptions {
        root,
        recursive: cli.recursive,
        follow_links: cli.follow_links,
        algorithm: cli.hash.into(),
        parallel: cli.workers.is_some_and(|n| n > 1),
    };

    println!("Signature Scanner");
    println!("Scanning {} ({})", options.root.display(), scan_mode(&options));
    println!("Appending matches to {}", cli.output.display());
    println!();

    let control = if cli.batch {
        control
    } else {
        control.with_progress(spinner()?)
    };

    let summary = scan_to_csv(&options, &cli.output, &control)
        .with_context(|| format!("Scan of {} could not start", options.root.display()))?;

    control.progress.finish_and_clear();
    if summary.interrupted {
        eprintln!("Scan interrupted; rows written so far are complete");
    }

    print_summary(&summary);

    if let Some(report) = &cli.report {
        write_report(report, &options, &cli.output, &summary)
            .with_context(|| format!("Failed to write report {}", report.display()))?;
        println!("Detailed report saved to: {}", report.display());
    }

    if summary.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Resolve the scan root to an absolute path so recorded paths are absolute
fn validate_directory(dir: &Path) -> Result<PathBuf> {
    let root = dir
        .canonicalize()
        .with_context(|| format!("Directory {} does not exist", dir.display()))?;
    if !root.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    Ok(root)
}

fn scan_mode(options: &ScanOptions) -> String {
    let depth = if options.recursive { "recursive" } else { "top level only" };
    let threads = if options.parallel {
        format!("{} threads", rayon::current_num_threads())
    } else {
        "1 thread".to_string()
    };
    format!("{}, {}, {}", depth, options.algorithm, threads)
}

fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} files scanned, {msg}")
            .context("Invalid progress template")?,
    );
    pb.set_message("0 matched");
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

fn print_summary(summary: &ScanSummary) {
    println!("==================================================");
    println!("SCAN COMPLETE");
    println!("==================================================");
    println!("Files scanned: {}", summary.scanned);
    println!("Signature matches: {}", summary.matched);
    for (file_type, count) in &summary.by_type {
        println!("  {}: {}", file_type, count);
    }
    println!("Rows recorded: {}", summary.recorded);
    println!("Entries skipped: {}", summary.skipped.len());
    println!("Failed to record: {}", summary.failed_to_record());
    println!();
}
