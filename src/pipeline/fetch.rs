//! Archive fetch: ask the API for a signed URL, stream the ZIP to disk.
//!
//! ## Why a drop guard for the archive?
//!
//! The temporary ZIP must disappear on every path that gets past a
//! successful download — extraction failure, assembly failure, and the
//! normal end of the run alike. Tying the deletion to [`TempArchive`]'s
//! `Drop` gives all of those paths the same cleanup without any of them
//! having to remember it, and a deletion failure degrades to a warning
//! because the file is in the caller's working directory where they can
//! remove it by hand.

use crate::config::JobConfig;
use crate::error::Shots2PdfError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// The downloaded archive on disk. Removing the file is tied to drop.
pub struct TempArchive {
    path: PathBuf,
    bytes: u64,
}

impl TempArchive {
    /// Path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the downloaded archive in bytes.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed temporary archive {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Could not remove temporary archive {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Listing response from the screenshots endpoint. Only `url` matters;
/// every other field the API sends is ignored.
#[derive(Debug, Deserialize)]
struct ArchiveListing {
    #[serde(default)]
    url: Option<String>,
}

/// Fetch the session's screenshot archive to
/// `<work_dir>/screenshots_<sessionId>.zip`.
///
/// Two sequential calls: the listing endpoint (JSON, carries the signed
/// archive URL) and the archive itself, streamed chunk-by-chunk to disk.
/// A failure while the file is being written removes the partial file
/// before the error propagates.
pub async fn fetch_archive(config: &JobConfig) -> Result<TempArchive, Shots2PdfError> {
    let client = reqwest::Client::builder()
        .build()
        .map_err(|e| Shots2PdfError::Internal(format!("HTTP client: {e}")))?;

    let url = request_archive_url(&client, config).await?;
    debug!("Archive URL resolved for session {}", config.session_id);

    download_archive(&client, &url, config).await
}

/// Ask the listing endpoint for the signed archive URL.
async fn request_archive_url(
    client: &reqwest::Client,
    config: &JobConfig,
) -> Result<String, Shots2PdfError> {
    let endpoint = format!("{}/{}/screenshots", config.api_base_url, config.session_id);
    info!("Fetching screenshot listing: {}", endpoint);

    let response = client
        .get(&endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .header(reqwest::header::AUTHORIZATION, config.auth_header.as_str())
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .send()
        .await
        .map_err(|e| classify_api_error(e, &endpoint, config.api_timeout_secs))?;

    if !response.status().is_success() {
        return Err(Shots2PdfError::ApiRequestFailed {
            url: endpoint,
            reason: format!("HTTP {}", response.status()),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_api_error(e, &endpoint, config.api_timeout_secs))?;

    let listing: ArchiveListing =
        serde_json::from_slice(&body).map_err(|e| Shots2PdfError::ApiRequestFailed {
            url: endpoint,
            reason: format!("invalid JSON body: {e}"),
        })?;

    listing
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| Shots2PdfError::ArchiveUrlMissing {
            session_id: config.session_id.clone(),
        })
}

/// Stream the archive URL into the work directory.
async fn download_archive(
    client: &reqwest::Client,
    url: &str,
    config: &JobConfig,
) -> Result<TempArchive, Shots2PdfError> {
    info!("Downloading screenshot archive…");

    let response = client
        .get(url)
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .send()
        .await
        .map_err(|e| classify_download_error(e, url, config.download_timeout_secs))?;

    if !response.status().is_success() {
        return Err(Shots2PdfError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let total = response.content_length();
    if let Some(ref cb) = config.progress_callback {
        cb.on_download_start(total);
    }

    let zip_path = config.work_dir.join(config.archive_file_name());
    let file = tokio::fs::File::create(&zip_path).await.map_err(|e| {
        Shots2PdfError::ArchiveWriteFailed {
            path: zip_path.clone(),
            source: e,
        }
    })?;

    // From here on any failure must take the partial file with it.
    match stream_to_file(response, file, &zip_path, total, url, config).await {
        Ok(bytes) => {
            info!("Downloaded {} bytes to {}", bytes, zip_path.display());
            Ok(TempArchive {
                path: zip_path,
                bytes,
            })
        }
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&zip_path).await {
                warn!(
                    "Could not remove partial archive {}: {}",
                    zip_path.display(),
                    rm
                );
            }
            Err(e)
        }
    }
}

/// Copy the response body into `file`, reporting progress per chunk.
async fn stream_to_file(
    mut response: reqwest::Response,
    mut file: tokio::fs::File,
    zip_path: &Path,
    total: Option<u64>,
    url: &str,
    config: &JobConfig,
) -> Result<u64, Shots2PdfError> {
    let mut written: u64 = 0;

    loop {
        let chunk = response
            .chunk()
            .await
            .map_err(|e| classify_download_error(e, url, config.download_timeout_secs))?;
        let Some(chunk) = chunk else { break };

        file.write_all(&chunk)
            .await
            .map_err(|e| Shots2PdfError::ArchiveWriteFailed {
                path: zip_path.to_path_buf(),
                source: e,
            })?;
        written += chunk.len() as u64;

        if let Some(ref cb) = config.progress_callback {
            cb.on_download_progress(written, total);
        }
    }

    file.flush()
        .await
        .map_err(|e| Shots2PdfError::ArchiveWriteFailed {
            path: zip_path.to_path_buf(),
            source: e,
        })?;

    Ok(written)
}

fn classify_api_error(e: reqwest::Error, url: &str, secs: u64) -> Shots2PdfError {
    if e.is_timeout() {
        Shots2PdfError::ApiTimeout {
            url: url.to_string(),
            secs,
        }
    } else {
        Shots2PdfError::ApiRequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

fn classify_download_error(e: reqwest::Error, url: &str, secs: u64) -> Shots2PdfError {
    if e.is_timeout() {
        Shots2PdfError::DownloadTimeout {
            url: url.to_string(),
            secs,
        }
    } else {
        Shots2PdfError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_with_url_parses() {
        let listing: ArchiveListing =
            serde_json::from_str(r#"{"url":"https://cdn.example.com/a.zip","status":"done"}"#)
                .unwrap();
        assert_eq!(listing.url.as_deref(), Some("https://cdn.example.com/a.zip"));
    }

    #[test]
    fn listing_without_url_parses_to_none() {
        let listing: ArchiveListing = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(listing.url.is_none());
    }

    #[test]
    fn listing_with_null_url_parses_to_none() {
        let listing: ArchiveListing = serde_json::from_str(r#"{"url":null}"#).unwrap();
        assert!(listing.url.is_none());
    }

    #[test]
    fn temp_archive_removes_file_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenshots_test.zip");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let archive = TempArchive {
            path: path.clone(),
            bytes: 4,
        };
        assert_eq!(archive.bytes(), 4);
        assert!(path.exists());

        drop(archive);
        assert!(!path.exists(), "drop must remove the archive");
    }

    #[test]
    fn temp_archive_drop_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TempArchive {
            path: dir.path().join("never_written.zip"),
            bytes: 0,
        };
        drop(archive); // must not panic
    }
}
