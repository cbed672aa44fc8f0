//! Error types for the shots2pdf library.
//!
//! A single fatal error type, [`Shots2PdfError`], covers every failure that
//! aborts the run. The one tolerated partial failure — an individual
//! screenshot that cannot be decoded — never becomes an error at all: the
//! assembly stage skips the file, records it in
//! [`crate::output::SkippedImage`], and keeps going.
//!
//! Every stage returns `Result` and propagates with `?`; only the binary's
//! top level turns an error into a process exit status.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the shots2pdf library.
#[derive(Debug, Error)]
pub enum Shots2PdfError {
    // ── Usage errors ──────────────────────────────────────────────────────
    /// The session identifier is not a 36-character UUID string.
    #[error("Invalid session id '{id}': expected 36 characters, got {got}\nPass the session UUID exactly as shown in the automation dashboard.")]
    InvalidSessionId { id: String, got: usize },

    /// The authorization header value is absent or empty.
    #[error("AUTH_HEADER is missing or empty.\nRun like this:\n  AUTH_HEADER=\"Basic <encoded>\" shots2pdf <SESSION_ID> [--output <DIR>]")]
    MissingCredential,

    /// Builder validation failed for some other reason.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Network errors ────────────────────────────────────────────────────
    /// The screenshot-listing API call failed (connection error, non-2xx
    /// status, or undecodable body).
    #[error("API request failed for '{url}': {reason}\nCheck the session id and your network connection.")]
    ApiRequestFailed { url: String, reason: String },

    /// The screenshot-listing API call exceeded its deadline.
    #[error("API request timed out after {secs}s for '{url}'\nIncrease --api-timeout.")]
    ApiTimeout { url: String, secs: u64 },

    /// The API responded, but the body carried no archive URL.
    #[error("Screenshot ZIP URL not found for session '{session_id}'")]
    ArchiveUrlMissing { session_id: String },

    /// The archive download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// The archive download exceeded its deadline.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Filesystem errors ─────────────────────────────────────────────────
    /// Could not create or write the local archive file.
    #[error("Failed to write archive '{path}': {source}")]
    ArchiveWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The archive file vanished between download and extraction.
    #[error("Archive not found: '{path}'")]
    ArchiveNotFound { path: PathBuf },

    /// The archive could not be opened or unpacked.
    #[error("Failed to extract '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// A required directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    DirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// The extraction directory holds no files with a supported extension.
    #[error("No valid screenshots found in '{dir}'\nSupported extensions: .png, .jpg, .jpeg (lowercase).")]
    NoScreenshots { dir: PathBuf },

    /// Every candidate image failed to decode; the document would be empty.
    #[error("All {total} screenshots failed to decode; no pages produced.\nFirst error: {first_error}")]
    AllImagesFailed { total: usize, first_error: String },

    /// Could not finalise or write the output PDF.
    #[error("Failed to write output PDF '{path}': {detail}")]
    PdfWriteFailed { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
