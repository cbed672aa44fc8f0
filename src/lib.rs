//! # shots2pdf
//!
//! Download a test session's screenshot archive and bundle the images into
//! a single PDF, one page per screenshot.
//!
//! ## What it does
//!
//! Mobile-automation sessions record a screenshot per step. The API serves
//! them as a ZIP behind a signed URL; reviewing them one file at a time is
//! tedious and they are awkward to attach to a bug report. This crate turns
//! a session id into a single scrollable document: every page has exactly
//! the pixel dimensions of its screenshot, so nothing is cropped or
//! letterboxed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! session id
//!  │
//!  ├─ 1. Fetch     GET /sessions/<id>/screenshots → { url } →
//!  │               stream ZIP to screenshots_<id>.zip
//!  ├─ 2. Extract   unzip into screenshots_<id>/
//!  ├─ 3. Assemble  sorted *.png / *.jpg / *.jpeg → one page each →
//!  │               <outputDir>/screenshots_<id>.pdf
//!  └─ 4. Cleanup   remove the temporary ZIP (best-effort)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shots2pdf::{run, JobConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JobConfig::builder()
//!         .session_id("123e4567-e89b-12d3-a456-426614174000")
//!         .auth_header(std::env::var("AUTH_HEADER")?)
//!         .output_dir("./reports")
//!         .build()?;
//!
//!     let report = run(&config).await?;
//!     println!("{} pages → {}", report.pages_added, report.pdf_path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `shots2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! shots2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{JobConfig, JobConfigBuilder, DEFAULT_API_BASE, SESSION_ID_LEN};
pub use error::Shots2PdfError;
pub use output::{RunReport, SkippedImage};
pub use progress::{JobProgressCallback, NoopProgressCallback, ProgressCallback};
pub use run::{run, run_sync};
