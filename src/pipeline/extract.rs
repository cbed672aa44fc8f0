//! Archive extraction: unpack the ZIP into `screenshots_<sessionId>/`.
//!
//! The `zip` crate is synchronous, so the unpack runs under
//! `tokio::task::spawn_blocking` to keep the runtime's worker threads free.
//! Existing files of the same name are overwritten; the directory itself is
//! reused if a previous run left it behind.

use crate::config::JobConfig;
use crate::error::Shots2PdfError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extract every entry of `archive` into the session's extraction
/// directory, returning that directory's path.
///
/// The directory is created under the work directory and is left in place
/// after the run for the caller to inspect.
pub async fn extract_archive(
    archive: &Path,
    config: &JobConfig,
) -> Result<PathBuf, Shots2PdfError> {
    if !archive.exists() {
        return Err(Shots2PdfError::ArchiveNotFound {
            path: archive.to_path_buf(),
        });
    }

    let dest = config.work_dir.join(config.extract_dir_name());
    tokio::fs::create_dir_all(&dest)
        .await
        .map_err(|e| Shots2PdfError::DirCreateFailed {
            path: dest.clone(),
            source: e,
        })?;

    info!("Extracting screenshots to {}", dest.display());

    let archive_path = archive.to_path_buf();
    let dest_path = dest.clone();
    let entries = tokio::task::spawn_blocking(move || extract_blocking(&archive_path, &dest_path))
        .await
        .map_err(|e| Shots2PdfError::Internal(format!("Extraction task panicked: {e}")))??;

    info!("Extracted {} entries", entries);
    Ok(dest)
}

/// Blocking unpack, returning the number of archive entries.
fn extract_blocking(archive: &Path, dest: &Path) -> Result<usize, Shots2PdfError> {
    let file = std::fs::File::open(archive).map_err(|e| Shots2PdfError::ExtractionFailed {
        path: archive.to_path_buf(),
        detail: e.to_string(),
    })?;

    let mut zip =
        zip::ZipArchive::new(file).map_err(|e| Shots2PdfError::ExtractionFailed {
            path: archive.to_path_buf(),
            detail: e.to_string(),
        })?;

    let entries = zip.len();
    zip.extract(dest).map_err(|e| Shots2PdfError::ExtractionFailed {
        path: archive.to_path_buf(),
        detail: e.to_string(),
    })?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SESSION_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn test_config(work_dir: &Path) -> JobConfig {
        JobConfig::builder()
            .session_id(SESSION_ID)
            .auth_header("Basic abc123")
            .work_dir(work_dir)
            .build()
            .unwrap()
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn extracts_entries_into_session_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let zip_path = dir.path().join(config.archive_file_name());
        write_zip(&zip_path, &[("a.png", b"not-a-real-png"), ("note.txt", b"hi")]);

        let dest = extract_archive(&zip_path, &config).await.expect("extract");

        assert_eq!(dest, dir.path().join(format!("screenshots_{SESSION_ID}")));
        assert_eq!(
            std::fs::read(dest.join("a.png")).unwrap(),
            b"not-a-real-png"
        );
        assert_eq!(std::fs::read(dest.join("note.txt")).unwrap(), b"hi");
    }

    #[tokio::test]
    async fn overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let dest = dir.path().join(config.extract_dir_name());
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(dest.join("a.png"), b"stale").unwrap();

        let zip_path = dir.path().join(config.archive_file_name());
        write_zip(&zip_path, &[("a.png", b"fresh")]);

        extract_archive(&zip_path, &config).await.expect("extract");
        assert_eq!(std::fs::read(dest.join("a.png")).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn missing_archive_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = extract_archive(&dir.path().join("nope.zip"), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Shots2PdfError::ArchiveNotFound { .. }));
    }

    #[tokio::test]
    async fn corrupt_archive_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let zip_path = dir.path().join(config.archive_file_name());
        std::fs::write(&zip_path, b"definitely not a zip file").unwrap();

        let err = extract_archive(&zip_path, &config).await.unwrap_err();
        assert!(matches!(err, Shots2PdfError::ExtractionFailed { .. }));
    }
}
