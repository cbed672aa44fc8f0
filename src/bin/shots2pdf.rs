//! CLI binary for shots2pdf.
//!
//! A thin shim over the library crate that maps CLI flags and environment
//! variables to `JobConfig` and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use shots2pdf::{run, JobConfig, JobProgressCallback, ProgressCallback, DEFAULT_API_BASE};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a byte bar while the archive downloads, then a page
/// counter with one log line per screenshot during assembly.
struct CliProgress {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Contacting API…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl JobProgressCallback for CliProgress {
    fn on_download_start(&self, total_bytes: Option<u64>) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_bytes.unwrap_or(0));
        self.bar.set_style(style);
        self.bar.set_prefix("Downloading");
    }

    fn on_download_progress(&self, bytes_written: u64, _total_bytes: Option<u64>) {
        self.bar.set_position(bytes_written);
    }

    fn on_assembly_start(&self, total_images: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} images",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_images as u64);
        self.bar.set_position(0);
        self.bar.set_style(style);
        self.bar.set_prefix("Assembling");
    }

    fn on_image_added(&self, index: usize, total: usize, name: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(name),
        ));
        self.bar.inc(1);
    }

    fn on_image_skipped(&self, index: usize, total: usize, name: &str, reason: String) {
        self.skipped.fetch_add(1, Ordering::SeqCst);

        // Truncate very long decode errors to keep output tidy.
        let msg = if reason.len() > 80 {
            format!("{}\u{2026}", &reason[..79])
        } else {
            reason
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            name,
            red(&msg),
        ));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export a session's screenshots to ./screenshots_<id>.pdf
  AUTH_HEADER="Basic dXNlcjprZXk=" shots2pdf 123e4567-e89b-12d3-a456-426614174000

  # Write the PDF into a reports directory
  shots2pdf 123e4567-e89b-12d3-a456-426614174000 --output ./reports

  # Machine-readable summary
  shots2pdf 123e4567-e89b-12d3-a456-426614174000 --json

ENVIRONMENT VARIABLES:
  AUTH_HEADER                Full Authorization header value (required),
                             e.g. "Basic dXNlcjprZXk="
  SHOTS2PDF_OUTPUT           Default for --output
  SHOTS2PDF_API_BASE         Default for --api-base
  SHOTS2PDF_API_TIMEOUT      Default for --api-timeout
  SHOTS2PDF_DOWNLOAD_TIMEOUT Default for --download-timeout

ARTIFACTS (relative to the working directory):
  screenshots_<id>.zip       Temporary download, removed when the run ends
  screenshots_<id>/          Extracted images, left in place
  <output>/screenshots_<id>.pdf
"#;

/// Bundle a test session's screenshots into a single PDF.
#[derive(Parser, Debug)]
#[command(
    name = "shots2pdf",
    version,
    about = "Bundle a test session's screenshots into a single PDF",
    long_about = "Download the screenshot ZIP of a mobile-automation session and assemble the \
images into one PDF document, one page per screenshot, each page sized to the screenshot's \
pixel dimensions.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Session UUID (36 characters).
    session_id: String,

    /// Directory the PDF is written into. Defaults to the working directory.
    #[arg(short, long, env = "SHOTS2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Authorization header value. Normally supplied via AUTH_HEADER.
    #[arg(long, env = "AUTH_HEADER", hide_env_values = true)]
    auth_header: Option<String>,

    /// Screenshot-listing API base URL.
    #[arg(long, env = "SHOTS2PDF_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Listing-call timeout in seconds.
    #[arg(long, env = "SHOTS2PDF_API_TIMEOUT", default_value_t = 10)]
    api_timeout: u64,

    /// Archive-download timeout in seconds.
    #[arg(long, env = "SHOTS2PDF_DOWNLOAD_TIMEOUT", default_value_t = 20)]
    download_timeout: u64,

    /// Directory for the temporary ZIP and the extraction directory.
    #[arg(long, env = "SHOTS2PDF_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Print the run report as JSON instead of a summary line.
    #[arg(long, env = "SHOTS2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "SHOTS2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "SHOTS2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "SHOTS2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar is active;
    // the bar provides the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let output_dir = match cli.output {
        Some(ref dir) => std::path::absolute(dir)
            .with_context(|| format!("Cannot resolve output directory {:?}", dir))?,
        None => std::env::current_dir().context("Cannot determine the working directory")?,
    };

    let progress = if show_progress {
        Some(CliProgress::new())
    } else {
        None
    };

    let mut builder = JobConfig::builder()
        .session_id(&cli.session_id)
        .auth_header(cli.auth_header.clone().unwrap_or_default())
        .output_dir(&output_dir)
        .api_base_url(&cli.api_base)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref dir) = cli.work_dir {
        builder = builder.work_dir(dir);
    }
    if let Some(ref cb) = progress {
        builder = builder.progress_callback(Arc::clone(cb) as ProgressCallback);
    }

    // Length and credential checks happen here, before any network call.
    let config = builder.build()?;

    // ── Run ──────────────────────────────────────────────────────────────
    let result = run(&config).await;

    if let Some(ref cb) = progress {
        cb.finish();
    }

    let report = result.context("Screenshot export failed")?;

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        let tick = if report.skipped.is_empty() {
            green("✔")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{}  {}/{} screenshots  {}ms  →  {}",
            tick,
            report.pages_added,
            report.images_found,
            report.total_duration_ms,
            bold(&report.pdf_path.display().to_string()),
        );
        for skipped in &report.skipped {
            eprintln!(
                "   {} {}  {}",
                red("✗"),
                skipped.name,
                dim(&skipped.reason)
            );
        }
    }

    Ok(())
}
