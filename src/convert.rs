//! Conversion entry points.
//!
//! [`convert_document`] is the routine itself and works over any
//! [`PageSource`]. [`convert_file`] opens a PDF through the shared PDFium
//! binding and runs it on the calling thread; [`convert`] does the same on
//! tokio's blocking pool.
//!
//! The routine never writes the destination before the last page is on its
//! slide: the deck is assembled in memory and saved once, so a failed or
//! cancelled run leaves any existing file untouched.

use crate::cancel::CancellationToken;
use crate::canvas::Canvas;
use crate::config::ConversionConfig;
use crate::deck::Deck;
use crate::engine;
use crate::error::Pdf2PptxError;
use crate::output::{ConversionOutcome, ConversionStats, DocumentInfo};
use crate::pipeline::source::{PageSource, PdfiumSource};
use crate::pipeline::{input, raster};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every page of `source` into a full-bleed picture slide and save
/// the deck to `output`.
///
/// The cancellation token is checked before each page and once more before
/// saving. A cancelled run returns [`ConversionOutcome::Cancelled`] and does
/// not touch `output`.
///
/// # Errors
/// Any failure aborts the run:
/// - invalid configuration or destination
/// - [`Pdf2PptxError::EmptyDocument`] when the source has no pages
/// - unusable first-page size or a canvas outside the slide-size limits
/// - rasterisation, temporary-file or output write failures
pub fn convert_document<S: PageSource + ?Sized>(
    source: &mut S,
    output: &Path,
    config: &ConversionConfig,
    cancel: &CancellationToken,
) -> Result<ConversionOutcome, Pdf2PptxError> {
    convert_pages(source, output, config, cancel, &mut |_| {})
}

/// [`convert_document`] with a hook called on each staged image path after
/// its slide is placed and before the file is deleted.
fn convert_pages<S: PageSource + ?Sized>(
    source: &mut S,
    output: &Path,
    config: &ConversionConfig,
    cancel: &CancellationToken,
    before_cleanup: &mut dyn FnMut(&Path),
) -> Result<ConversionOutcome, Pdf2PptxError> {
    let total_start = Instant::now();
    config.validate()?;
    input::check_destination(output)?;

    let total_pages = source.page_count();
    if total_pages == 0 {
        return Err(Pdf2PptxError::EmptyDocument);
    }

    let first_page = source.page_size(0)?;
    let canvas = Canvas::from_first_page(config.slide_width_in, first_page)?;
    let (slide_cx, slide_cy) = (canvas.width_emu(), canvas.height_emu());
    info!(
        "Converting {} pages at {} DPI onto a {:.3}in × {:.3}in canvas",
        total_pages, config.dpi, canvas.width_in, canvas.height_in
    );

    let staging_dir = staging_dir(config, output);
    debug!("Staging page images in {}", staging_dir.display());

    let mut deck = Deck::new(canvas);
    if let Some(title) = source.title() {
        deck.set_title(title);
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages, &canvas);
    }

    let mut distorted_pages = Vec::new();
    let mut render_ms = 0u64;

    for index in 0..total_pages {
        if cancel.is_cancelled() {
            return Ok(cancelled(config, index, total_pages));
        }

        let page_num = index + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let size = if index == 0 {
            first_page
        } else {
            source.page_size(index)?
        };
        if !size.is_usable() {
            return Err(Pdf2PptxError::InvalidPageSize {
                page: page_num,
                width: size.width,
                height: size.height,
            });
        }
        if canvas.distorts(size) {
            warn!(
                "Page {} is {}×{} pt; its aspect ratio differs from page 1 and it will be stretched",
                page_num, size.width, size.height
            );
            distorted_pages.push(page_num);
        }

        let render_start = Instant::now();
        let image = source.rasterize(index, config.dpi)?;
        let staged = raster::stage_page(&image, page_num, &staging_dir)?;
        drop(image);
        render_ms += render_start.elapsed().as_millis() as u64;

        deck.add_slide()
            .place_picture(staged.path(), 0, 0, slide_cx, slide_cy)?;
        let image_bytes = staged.byte_len();
        before_cleanup(staged.path());
        staged.discard()?;

        debug!("Page {}/{} on slide ({} bytes)", page_num, total_pages, image_bytes);
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(page_num, total_pages, image_bytes);
        }
    }

    if cancel.is_cancelled() {
        return Ok(cancelled(config, total_pages, total_pages));
    }

    let save_start = Instant::now();
    let deck_bytes = deck.save(output)?;
    let save_duration_ms = save_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        total_pages,
        slides_written: deck.slide_count(),
        canvas,
        dpi: config.dpi,
        output_path: output.to_path_buf(),
        deck_bytes,
        distorted_pages,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms: render_ms,
        save_duration_ms,
    };

    info!(
        "Conversion complete: {} slides → {} ({} bytes, {}ms)",
        stats.slides_written,
        output.display(),
        deck_bytes,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, output);
    }

    Ok(ConversionOutcome::Completed(stats))
}

/// Convert the PDF at `input` to a deck at `output`, blocking the caller.
///
/// Validates both paths, binds PDFium for the calling thread and runs
/// [`convert_document`].
pub fn convert_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
    cancel: &CancellationToken,
) -> Result<ConversionOutcome, Pdf2PptxError> {
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();
    info!(
        "Starting conversion: {} → {}",
        input_path.display(),
        output_path.display()
    );

    config.validate()?;
    input::check_source(input_path)?;
    input::check_destination(output_path)?;

    let pdfium = engine::bind_pdfium()?;
    let mut source = PdfiumSource::open(&pdfium, input_path, config.password.as_deref())?;
    convert_document(&mut source, output_path, config, cancel)
}

/// Async wrapper around [`convert_file`].
///
/// PDFium is CPU-bound and blocking, so the run is moved onto tokio's
/// blocking pool.
pub async fn convert(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
    cancel: &CancellationToken,
) -> Result<ConversionOutcome, Pdf2PptxError> {
    let input_path = input_path.as_ref().to_path_buf();
    let output_path = output_path.as_ref().to_path_buf();
    let config = config.clone();
    let cancel = cancel.clone();

    tokio::task::spawn_blocking(move || convert_file(&input_path, &output_path, &config, &cancel))
        .await
        .map_err(|e| Pdf2PptxError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Report page count, first-page size and resulting canvas without rendering.
pub fn inspect(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<DocumentInfo, Pdf2PptxError> {
    let input_path = input_path.as_ref();
    config.validate()?;
    input::check_source(input_path)?;

    let pdfium = engine::bind_pdfium()?;
    let source = PdfiumSource::open(&pdfium, input_path, config.password.as_deref())?;
    describe_document(&source, input_path, config)
}

/// [`inspect`] over any [`PageSource`].
pub fn describe_document<S: PageSource + ?Sized>(
    source: &S,
    path: &Path,
    config: &ConversionConfig,
) -> Result<DocumentInfo, Pdf2PptxError> {
    let page_count = source.page_count();
    if page_count == 0 {
        return Err(Pdf2PptxError::EmptyDocument);
    }
    let first_page = source.page_size(0)?;
    let canvas = Canvas::from_first_page(config.slide_width_in, first_page)?;

    Ok(DocumentInfo {
        path: path.to_path_buf(),
        title: source.title(),
        page_count,
        first_page,
        canvas,
    })
}

fn cancelled(config: &ConversionConfig, processed: usize, total: usize) -> ConversionOutcome {
    warn!(
        "Conversion cancelled after {}/{} pages; output not written",
        processed, total
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_cancelled(processed, total);
    }
    ConversionOutcome::Cancelled {
        processed_pages: processed,
        total_pages: total,
    }
}

/// Directory for temporary page images: `temp_dir` if set, else next to the output.
fn staging_dir(config: &ConversionConfig, output: &Path) -> PathBuf {
    config
        .temp_dir
        .clone()
        .unwrap_or_else(|| input::output_dir(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageSize;
    use image::{DynamicImage, Rgba, RgbaImage};

    struct Pages(Vec<PageSize>);

    impl PageSource for Pages {
        fn page_count(&self) -> usize {
            self.0.len()
        }

        fn page_size(&self, index: usize) -> Result<PageSize, Pdf2PptxError> {
            Ok(self.0[index])
        }

        fn rasterize(&mut self, index: usize, _dpi: u32) -> Result<DynamicImage, Pdf2PptxError> {
            let s = self.0[index];
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                (s.width / 10.0) as u32,
                (s.height / 10.0) as u32,
                Rgba([255, 255, 255, 255]),
            )))
        }
    }

    #[test]
    fn staging_defaults_to_output_directory() {
        let config = ConversionConfig::default();
        assert_eq!(
            staging_dir(&config, Path::new("/out/deck.pptx")),
            PathBuf::from("/out")
        );

        let config = ConversionConfig::builder().temp_dir("/scratch").build().unwrap();
        assert_eq!(
            staging_dir(&config, Path::new("/out/deck.pptx")),
            PathBuf::from("/scratch")
        );
    }

    #[test]
    fn describe_reports_canvas() {
        let source = Pages(vec![PageSize::new(612.0, 792.0); 3]);
        let info =
            describe_document(&source, Path::new("a.pdf"), &ConversionConfig::default()).unwrap();
        assert_eq!(info.page_count, 3);
        assert_eq!(info.canvas.width_emu(), 9_144_000);
        assert_eq!(info.canvas.height_emu(), 11_833_412);
        assert!(info.title.is_none());
    }

    #[test]
    fn describe_rejects_empty_document() {
        let err = describe_document(&Pages(vec![]), Path::new("a.pdf"), &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::EmptyDocument));
    }

    #[test]
    fn zero_sized_later_page_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.pptx");
        let mut source = Pages(vec![PageSize::new(612.0, 792.0), PageSize::new(0.0, 0.0)]);
        let err = convert_document(
            &mut source,
            &out,
            &ConversionConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::InvalidPageSize { page: 2, .. }));
        assert!(!out.exists());
    }

    #[test]
    fn failed_temp_cleanup_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.pptx");
        std::fs::write(&out, b"previous deck").unwrap();
        let mut source = Pages(vec![PageSize::new(612.0, 792.0); 3]);

        let mut seen = 0;
        let err = convert_pages(
            &mut source,
            &out,
            &ConversionConfig::default(),
            &CancellationToken::new(),
            &mut |staged| {
                seen += 1;
                if seen == 2 {
                    std::fs::remove_file(staged).unwrap();
                }
            },
        )
        .unwrap_err();

        assert!(matches!(err, Pdf2PptxError::TempCleanupFailed { .. }), "got: {err}");
        assert_eq!(seen, 2, "run must stop at the failed page");
        assert_eq!(std::fs::read(&out).unwrap(), b"previous deck");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("deck.pptx")]);
    }
}
