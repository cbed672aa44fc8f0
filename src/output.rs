//! Result types describing what a run produced.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of a completed run.
///
/// Returned by [`crate::run`]; the CLI prints it as a human summary or as
/// JSON with `--json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Session the run operated on.
    pub session_id: String,

    /// Absolute or config-relative path of the written document.
    pub pdf_path: PathBuf,

    /// Size of the downloaded archive in bytes.
    pub archive_bytes: u64,

    /// Files in the extraction directory with a supported extension.
    pub images_found: usize,

    /// Pages actually added to the document.
    pub pages_added: usize,

    /// Images that failed to decode and were skipped.
    pub skipped: Vec<SkippedImage>,

    /// Wall-clock duration of the whole run in milliseconds.
    pub total_duration_ms: u64,
}

impl RunReport {
    /// Number of skipped images.
    pub fn images_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// One image that could not be decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedImage {
    /// Filename within the extraction directory.
    pub name: String,
    /// Human-readable decode error.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serialises_to_json() {
        let report = RunReport {
            session_id: "123e4567-e89b-12d3-a456-426614174000".into(),
            pdf_path: PathBuf::from("out/screenshots_x.pdf"),
            archive_bytes: 2048,
            images_found: 3,
            pages_added: 2,
            skipped: vec![SkippedImage {
                name: "broken.png".into(),
                reason: "unexpected end of file".into(),
            }],
            total_duration_ms: 1234,
        };

        let json = serde_json::to_string_pretty(&report).expect("serialise");
        assert!(json.contains("broken.png"));

        let back: RunReport = serde_json::from_str(&json).expect("round-trip");
        assert_eq!(back.pages_added, 2);
        assert_eq!(back.images_skipped(), 1);
    }
}
