//! Document assembly: one PDF page per screenshot, sized to the pixels.
//!
//! Pages are sized so that one image pixel maps to one PDF point (the image
//! is placed at 72 dpi at the origin), which keeps each page exactly the
//! shape of its screenshot with no margins and no scaling artefacts.
//!
//! Image decoding and PDF serialisation are CPU-bound, so the whole stage
//! runs under `tokio::task::spawn_blocking`, mirroring how the download
//! stage keeps network I/O on the async side.
//!
//! A screenshot that fails to decode is skipped with a warning; this is the
//! only non-fatal failure in the pipeline. An empty candidate list, or a
//! list where every candidate fails, aborts the run.

use crate::config::JobConfig;
use crate::error::Shots2PdfError;
use crate::output::SkippedImage;
use crate::progress::ProgressCallback;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Millimetres per PDF point; page sizes are given to printpdf in Mm.
const MM_PER_PT: f32 = 25.4 / 72.0;

/// What the assembly stage produced.
#[derive(Debug)]
pub struct AssemblyOutcome {
    pub pdf_path: PathBuf,
    pub images_found: usize,
    pub pages_added: usize,
    pub skipped: Vec<SkippedImage>,
}

/// A decoded screenshot ready to become a page.
struct PageImage {
    name: String,
    width: u32,
    height: u32,
    /// Raw RGB8 pixel data, row-major.
    pixels: Vec<u8>,
}

/// Assemble every supported image in `shots_dir` into
/// `<output_dir>/screenshots_<sessionId>.pdf`.
pub async fn assemble_pdf(
    shots_dir: &Path,
    config: &JobConfig,
) -> Result<AssemblyOutcome, Shots2PdfError> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| Shots2PdfError::DirCreateFailed {
            path: config.output_dir.clone(),
            source: e,
        })?;

    let pdf_path = config.output_dir.join(config.pdf_file_name());
    info!("Generating PDF at {}", pdf_path.display());

    let dir = shots_dir.to_path_buf();
    let out = pdf_path.clone();
    let title = format!("Session {}", config.session_id);
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || assemble_blocking(&dir, &out, &title, progress))
        .await
        .map_err(|e| Shots2PdfError::Internal(format!("Assembly task panicked: {e}")))?
}

fn assemble_blocking(
    shots_dir: &Path,
    pdf_path: &Path,
    title: &str,
    progress: Option<ProgressCallback>,
) -> Result<AssemblyOutcome, Shots2PdfError> {
    let images = list_images(shots_dir).map_err(|e| {
        Shots2PdfError::Internal(format!("Failed to list '{}': {}", shots_dir.display(), e))
    })?;

    if images.is_empty() {
        return Err(Shots2PdfError::NoScreenshots {
            dir: shots_dir.to_path_buf(),
        });
    }

    let total = images.len();
    if let Some(ref cb) = progress {
        cb.on_assembly_start(total);
    }

    // Decode everything up front; the first page's dimensions are needed
    // before the document can exist.
    let mut pages: Vec<PageImage> = Vec::with_capacity(total);
    let mut skipped: Vec<SkippedImage> = Vec::new();

    for (i, path) in images.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match load_page_image(path, &name) {
            Ok(page) => {
                debug!("Decoded {} ({}x{})", name, page.width, page.height);
                if let Some(ref cb) = progress {
                    cb.on_image_added(i + 1, total, &name);
                }
                pages.push(page);
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                if let Some(ref cb) = progress {
                    cb.on_image_skipped(i + 1, total, &name, e.to_string());
                }
                skipped.push(SkippedImage {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    if pages.is_empty() {
        return Err(Shots2PdfError::AllImagesFailed {
            total,
            first_error: skipped
                .first()
                .map(|s| s.reason.clone())
                .unwrap_or_else(|| "unknown".to_string()),
        });
    }

    let pages_added = pages.len();

    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        px_to_mm(pages[0].width),
        px_to_mm(pages[0].height),
        "Screenshot",
    );
    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    for (i, shot) in pages.into_iter().enumerate() {
        if i > 0 {
            let (page_idx, layer_idx) =
                doc.add_page(px_to_mm(shot.width), px_to_mm(shot.height), "Screenshot");
            layer = doc.get_page(page_idx).get_layer(layer_idx);
        }
        place_on_layer(layer.clone(), shot);
    }

    let file = std::fs::File::create(pdf_path).map_err(|e| Shots2PdfError::PdfWriteFailed {
        path: pdf_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| Shots2PdfError::PdfWriteFailed {
            path: pdf_path.to_path_buf(),
            detail: e.to_string(),
        })?;

    info!("Added {}/{} screenshots as pages", pages_added, total);

    Ok(AssemblyOutcome {
        pdf_path: pdf_path.to_path_buf(),
        images_found: total,
        pages_added,
        skipped,
    })
}

/// Supported-extension files in `dir`, sorted lexicographically by name.
fn list_images(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if has_supported_extension(name) {
            out.push(path);
        }
    }
    out.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(out)
}

/// Lowercase `.png` / `.jpg` / `.jpeg` only; `.PNG` is not a match.
fn has_supported_extension(name: &str) -> bool {
    name.ends_with(".png") || name.ends_with(".jpg") || name.ends_with(".jpeg")
}

/// Decode a screenshot into raw RGB8 pixels plus dimensions.
fn load_page_image(path: &Path, name: &str) -> Result<PageImage, image::ImageError> {
    let rgb = image::open(path)?.to_rgb8();
    Ok(PageImage {
        name: name.to_string(),
        width: rgb.width(),
        height: rgb.height(),
        pixels: rgb.into_raw(),
    })
}

/// One pixel = one PDF point.
fn px_to_mm(px: u32) -> Mm {
    Mm(px as f32 * MM_PER_PT)
}

/// Draw `shot` at the page origin at 72 dpi, filling the page exactly.
fn place_on_layer(layer: printpdf::PdfLayerReference, shot: PageImage) {
    let xobject = ImageXObject {
        width: Px(shot.width as usize),
        height: Px(shot.height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: false,
        image_data: shot.pixels,
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    };

    Image::from(xobject).add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(72.0),
            ..Default::default()
        },
    );

    debug!("Placed {} on its page", shot.name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const SESSION_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn test_config(work_dir: &Path, output_dir: &Path) -> JobConfig {
        JobConfig::builder()
            .session_id(SESSION_ID)
            .auth_header("Basic abc123")
            .work_dir(work_dir)
            .output_dir(output_dir)
            .build()
            .unwrap()
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([40, 90, 200]))
            .save(path)
            .unwrap();
    }

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([200, 90, 40]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn extension_filter_is_case_sensitive() {
        assert!(has_supported_extension("a.png"));
        assert!(has_supported_extension("b.jpg"));
        assert!(has_supported_extension("c.jpeg"));
        assert!(!has_supported_extension("d.PNG"));
        assert!(!has_supported_extension("e.JPG"));
        assert!(!has_supported_extension("f.gif"));
        assert!(!has_supported_extension("png"));
        assert!(!has_supported_extension("archive.zip"));
    }

    #[test]
    fn one_pixel_is_one_point() {
        // 72 px at 72 dpi is one inch, i.e. 25.4 mm.
        assert!((px_to_mm(72).0 - 25.4).abs() < 1e-4);
        assert_eq!(px_to_mm(0).0, 0.0);
    }

    #[test]
    fn list_images_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.png", "z.txt", "c.jpeg", "d.PNG"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.png")).unwrap();

        let names: Vec<String> = list_images(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.png", "b.jpg", "c.jpeg"]);
    }

    #[tokio::test]
    async fn assembles_one_page_per_image() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(work.path(), out.path());

        let shots = work.path().join(config.extract_dir_name());
        std::fs::create_dir_all(&shots).unwrap();
        write_png(&shots.join("a.png"), 100, 200);
        write_jpeg(&shots.join("b.jpg"), 50, 50);
        std::fs::write(shots.join("ignored.bin"), b"junk").unwrap();

        let outcome = assemble_pdf(&shots, &config).await.expect("assemble");

        assert_eq!(outcome.images_found, 2);
        assert_eq!(outcome.pages_added, 2);
        assert!(outcome.skipped.is_empty());
        assert_eq!(
            outcome.pdf_path,
            out.path().join(format!("screenshots_{SESSION_ID}.pdf"))
        );
        let pdf = std::fs::read(&outcome.pdf_path).unwrap();
        assert!(pdf.starts_with(b"%PDF"), "output must be a PDF");
    }

    #[tokio::test]
    async fn corrupt_image_is_skipped_not_fatal() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(work.path(), out.path());

        let shots = work.path().join(config.extract_dir_name());
        std::fs::create_dir_all(&shots).unwrap();
        write_png(&shots.join("a.png"), 20, 20);
        std::fs::write(shots.join("broken.png"), b"this is not a png").unwrap();

        let outcome = assemble_pdf(&shots, &config).await.expect("assemble");
        assert_eq!(outcome.images_found, 2);
        assert_eq!(outcome.pages_added, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].name, "broken.png");
    }

    #[tokio::test]
    async fn empty_directory_is_fatal() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(work.path(), out.path());

        let shots = work.path().join(config.extract_dir_name());
        std::fs::create_dir_all(&shots).unwrap();
        std::fs::write(shots.join("readme.txt"), b"no images here").unwrap();

        let err = assemble_pdf(&shots, &config).await.unwrap_err();
        assert!(matches!(err, Shots2PdfError::NoScreenshots { .. }));
    }

    #[tokio::test]
    async fn all_images_corrupt_is_fatal() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = test_config(work.path(), out.path());

        let shots = work.path().join(config.extract_dir_name());
        std::fs::create_dir_all(&shots).unwrap();
        std::fs::write(shots.join("a.png"), b"junk").unwrap();
        std::fs::write(shots.join("b.jpg"), b"more junk").unwrap();

        let err = assemble_pdf(&shots, &config).await.unwrap_err();
        assert!(matches!(err, Shots2PdfError::AllImagesFailed { total: 2, .. }));
    }

    #[tokio::test]
    async fn output_directory_is_created_recursively() {
        let work = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let nested = out.path().join("reports").join("2026-08");
        let config = test_config(work.path(), &nested);

        let shots = work.path().join(config.extract_dir_name());
        std::fs::create_dir_all(&shots).unwrap();
        write_png(&shots.join("only.png"), 10, 10);

        let outcome = assemble_pdf(&shots, &config).await.expect("assemble");
        assert!(outcome.pdf_path.starts_with(&nested));
        assert!(outcome.pdf_path.exists());
    }
}
