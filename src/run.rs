//! Top-level orchestration: fetch → extract → assemble → cleanup.

use crate::config::JobConfig;
use crate::error::Shots2PdfError;
use crate::output::RunReport;
use crate::pipeline::{assemble, extract, fetch};
use std::time::Instant;
use tracing::info;

/// Run the whole job for the configured session.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(RunReport)` when a document was written, even if some individual
/// screenshots failed to decode (check `report.skipped`).
///
/// # Errors
/// Returns `Err(Shots2PdfError)` for every other failure: API errors,
/// download errors, extraction errors, no usable screenshots, output write
/// errors. The temporary archive is removed on all of those paths once it
/// exists; the extraction directory is always left in place.
pub async fn run(config: &JobConfig) -> Result<RunReport, Shots2PdfError> {
    let started = Instant::now();
    info!("Starting screenshot export for session {}", config.session_id);

    let archive = fetch::fetch_archive(config).await?;
    let archive_bytes = archive.bytes();

    let shots_dir = extract::extract_archive(archive.path(), config).await?;

    let outcome = assemble::assemble_pdf(&shots_dir, config).await?;

    // The archive guard removes the temporary ZIP here; failures there are
    // warnings only and never affect the result.
    drop(archive);

    let report = RunReport {
        session_id: config.session_id.clone(),
        pdf_path: outcome.pdf_path,
        archive_bytes,
        images_found: outcome.images_found,
        pages_added: outcome.pages_added,
        skipped: outcome.skipped,
        total_duration_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        "Done: {} pages from {} images in {}ms → {}",
        report.pages_added,
        report.images_found,
        report.total_duration_ms,
        report.pdf_path.display()
    );

    Ok(report)
}

/// Synchronous wrapper around [`run`].
///
/// Creates a temporary tokio runtime internally.
pub fn run_sync(config: &JobConfig) -> Result<RunReport, Shots2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Shots2PdfError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(run(config))
}
