//! Page sources: anything that can report page sizes and rasterise pages.
//!
//! The conversion routine only talks to [`PageSource`], so it can be driven by
//! PDFium in production and by a synthetic source in tests.

use crate::canvas::PageSize;
use crate::error::Pdf2PptxError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An ordered, read-only sequence of renderable pages.
///
/// Page indices are 0-based; error variants report 1-based page numbers.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Intrinsic size of page `index`, in points.
    fn page_size(&self, index: usize) -> Result<PageSize, Pdf2PptxError>;

    /// Render page `index` at `dpi` dots per inch.
    fn rasterize(&mut self, index: usize, dpi: u32) -> Result<DynamicImage, Pdf2PptxError>;

    /// Document title, used for the deck's core properties.
    fn title(&self) -> Option<String> {
        None
    }
}

/// A PDF opened through PDFium.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    path: PathBuf,
}

impl<'a> PdfiumSource<'a> {
    /// Open `path`, mapping PDFium's load errors onto password/corruption errors.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Self, Pdf2PptxError> {
        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    Pdf2PptxError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    Pdf2PptxError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                Pdf2PptxError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        info!(
            "PDF loaded: {} ({} pages)",
            path.display(),
            document.pages().len()
        );

        Ok(Self {
            document,
            path: path.to_path_buf(),
        })
    }

    fn page(&self, index: usize) -> Result<PdfPage<'a>, Pdf2PptxError> {
        let idx = u16::try_from(index).map_err(|_| Pdf2PptxError::RasterisationFailed {
            page: index + 1,
            detail: "page index exceeds PDFium's 16-bit range".into(),
        })?;
        self.document
            .pages()
            .get(idx)
            .map_err(|e| Pdf2PptxError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, Pdf2PptxError> {
        let page = self.page(index)?;
        Ok(PageSize::new(page.width().value, page.height().value))
    }

    fn rasterize(&mut self, index: usize, dpi: u32) -> Result<DynamicImage, Pdf2PptxError> {
        let page = self.page(index)?;
        let scale = dpi as f32 / 72.0;
        let width_px = (page.width().value * scale).round().max(1.0) as i32;
        let height_px = (page.height().value * scale).round().max(1.0) as i32;

        let render_config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_target_height(height_px);

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            Pdf2PptxError::RasterisationFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// The PDF `Title` entry, falling back to the file stem.
    fn title(&self) -> Option<String> {
        self.document
            .metadata()
            .get(PdfDocumentMetadataTagType::Title)
            .map(|t| t.value().trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| {
                self.path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
    }
}
