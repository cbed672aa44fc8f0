//! Configuration for a screenshot-to-PDF job.
//!
//! Everything a run needs travels in one [`JobConfig`] value, built via
//! [`JobConfigBuilder`]. The pipeline stages take the config as an explicit
//! argument and never read process-global state themselves, so two jobs with
//! different configs behave independently and a test can point a job at a
//! mock API without touching the environment.

use crate::error::Shots2PdfError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Base URL of the screenshot-listing API.
///
/// `GET {DEFAULT_API_BASE}/<sessionId>/screenshots` returns a JSON body with
/// a signed `url` field pointing at the session's screenshot ZIP.
pub const DEFAULT_API_BASE: &str =
    "https://mobile-api.lambdatest.com/mobile-automation/api/v1/sessions";

/// Canonical UUID string length; anything else is rejected before any I/O.
pub const SESSION_ID_LEN: usize = 36;

/// Configuration for a single download-extract-assemble run.
///
/// Built via [`JobConfig::builder()`].
///
/// # Example
/// ```rust
/// use shots2pdf::JobConfig;
///
/// let config = JobConfig::builder()
///     .session_id("123e4567-e89b-12d3-a456-426614174000")
///     .auth_header("Basic abc123")
///     .output_dir("./reports")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct JobConfig {
    /// The 36-character session UUID. Names every artifact of the run and
    /// addresses the remote resource.
    pub session_id: String,

    /// Full `Authorization` header value, passed to the API verbatim.
    /// Typically `Basic <encoded>`; the library never inspects it.
    pub auth_header: String,

    /// Directory the final PDF is written into (created recursively if
    /// absent). Default: `"."`.
    pub output_dir: PathBuf,

    /// Directory holding the temporary ZIP and the extraction directory.
    /// Default: `"."`.
    pub work_dir: PathBuf,

    /// Screenshot-listing API base URL. Default: [`DEFAULT_API_BASE`].
    /// Overridable so tests can point a run at a local mock server.
    pub api_base_url: String,

    /// Deadline for the listing call in seconds. Default: 10.
    pub api_timeout_secs: u64,

    /// Deadline for the archive download in seconds, covering the whole
    /// body stream. Default: 20.
    ///
    /// Archives are usually a few megabytes; 20 s is generous on any
    /// connection that will finish at all. There is no retry, so a stuck
    /// download should fail fast rather than hang the run.
    pub download_timeout_secs: u64,

    /// Optional progress callback. Default: none.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobConfig")
            .field("session_id", &self.session_id)
            .field("auth_header", &"<redacted>")
            .field("output_dir", &self.output_dir)
            .field("work_dir", &self.work_dir)
            .field("api_base_url", &self.api_base_url)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn JobProgressCallback>"),
            )
            .finish()
    }
}

impl JobConfig {
    /// Create a new builder for `JobConfig`.
    pub fn builder() -> JobConfigBuilder {
        JobConfigBuilder::default()
    }

    /// Filename of the temporary archive, `screenshots_<sessionId>.zip`.
    pub fn archive_file_name(&self) -> String {
        format!("screenshots_{}.zip", self.session_id)
    }

    /// Name of the extraction directory, `screenshots_<sessionId>`.
    pub fn extract_dir_name(&self) -> String {
        format!("screenshots_{}", self.session_id)
    }

    /// Filename of the output document, `screenshots_<sessionId>.pdf`.
    pub fn pdf_file_name(&self) -> String {
        format!("screenshots_{}.pdf", self.session_id)
    }
}

/// Builder for [`JobConfig`].
///
/// `build()` performs the usage validation the CLI relies on: session id
/// length and credential presence are checked here, before any network or
/// filesystem access can happen.
#[derive(Debug)]
pub struct JobConfigBuilder {
    config: JobConfig,
}

impl Default for JobConfigBuilder {
    fn default() -> Self {
        Self {
            config: JobConfig {
                session_id: String::new(),
                auth_header: String::new(),
                output_dir: PathBuf::from("."),
                work_dir: PathBuf::from("."),
                api_base_url: DEFAULT_API_BASE.to_string(),
                api_timeout_secs: 10,
                download_timeout_secs: 20,
                progress_callback: None,
            },
        }
    }
}

impl JobConfigBuilder {
    /// Set the session UUID. Surrounding whitespace is trimmed.
    pub fn session_id(mut self, id: impl AsRef<str>) -> Self {
        self.config.session_id = id.as_ref().trim().to_string();
        self
    }

    /// Set the `Authorization` header value.
    pub fn auth_header(mut self, value: impl Into<String>) -> Self {
        self.config.auth_header = value.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    /// Override the API base URL (trailing slashes are stripped).
    pub fn api_base_url(mut self, url: impl AsRef<str>) -> Self {
        self.config.api_base_url = url.as_ref().trim_end_matches('/').to_string();
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating the usage contract.
    ///
    /// # Errors
    /// * [`Shots2PdfError::InvalidSessionId`] — session id length ≠ 36.
    /// * [`Shots2PdfError::MissingCredential`] — empty auth header.
    /// * [`Shots2PdfError::InvalidConfig`] — empty API base URL.
    pub fn build(self) -> Result<JobConfig, Shots2PdfError> {
        let c = self.config;
        if c.session_id.len() != SESSION_ID_LEN {
            return Err(Shots2PdfError::InvalidSessionId {
                got: c.session_id.len(),
                id: c.session_id,
            });
        }
        if c.auth_header.trim().is_empty() {
            return Err(Shots2PdfError::MissingCredential);
        }
        if c.api_base_url.is_empty() {
            return Err(Shots2PdfError::InvalidConfig(
                "API base URL must not be empty".into(),
            ));
        }
        Ok(c)
    }
}
