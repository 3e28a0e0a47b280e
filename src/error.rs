//! Error types for the pdf2pptx library.
//!
//! Every failure aborts the whole conversion, so there is a single fatal
//! error type, [`Pdf2PptxError`]. Callers that only need to tell failures
//! apart coarsely (the interactive shell, exit codes) use
//! [`Pdf2PptxError::kind`].
//!
//! Cancellation is not an error: a cancelled run returns
//! [`crate::output::ConversionOutcome::Cancelled`].

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`Pdf2PptxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The PDF engine could not be loaded. Fatal at startup.
    MissingDependency,
    /// Bad or missing source path, empty document, bad configuration.
    InvalidInput,
    /// Disk, permission or temporary-file failure.
    Io,
}

/// All fatal errors returned by the pdf2pptx library.
#[derive(Debug, Error)]
pub enum Pdf2PptxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Nothing at the source path, or the path is a directory.
    #[error("Input PDF not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The source exists but cannot be opened for reading.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The source does not start with `%PDF`.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// Output path was empty.
    #[error("No output path given")]
    OutputPathEmpty,

    /// The directory that should receive the deck does not exist.
    #[error("Output directory does not exist: '{path}'")]
    OutputDirMissing { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDFium refused to load the document.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Encrypted document, no password configured.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// Encrypted document, configured password rejected.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The document has no pages, so there is no first page to size the canvas from.
    #[error("PDF has no pages; nothing to convert")]
    EmptyDocument,

    /// A page reported a width or height that is not a positive number.
    #[error("Page {page} has an unusable size {width}×{height} pt")]
    InvalidPageSize { page: usize, width: f32, height: f32 },

    /// The canvas derived from page 1 is outside what a deck can hold.
    #[error(
        "Slide size {width_in:.2}in × {height_in:.2}in is outside the supported range (1in–56in per side)"
    )]
    CanvasOutOfRange { width_in: f64, height_in: f64 },

    /// PDFium could not render a page to a bitmap.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The page raster could not be written to its temporary file.
    #[error("Failed to write page {page} image to '{path}': {detail}")]
    TempWriteFailed {
        page: usize,
        path: PathBuf,
        detail: String,
    },

    /// A temporary page image could not be read back into the deck.
    #[error("Failed to read temporary image '{path}': {source}")]
    TempReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A temporary page image could not be removed.
    #[error("Failed to clean up temporary image '{path}': {source}")]
    TempCleanupFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output deck.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A config value is outside its allowed range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// No usable PDFium shared library was found.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory).\n\
  • Place the library next to the pdf2pptx executable.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Worker thread or task failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2PptxError {
    /// Classify this error for display and exit-code purposes.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2PptxError::PdfiumBindingFailed(_) => ErrorKind::MissingDependency,
            Pdf2PptxError::FileNotFound { .. }
            | Pdf2PptxError::NotAPdf { .. }
            | Pdf2PptxError::OutputPathEmpty
            | Pdf2PptxError::OutputDirMissing { .. }
            | Pdf2PptxError::CorruptPdf { .. }
            | Pdf2PptxError::PasswordRequired { .. }
            | Pdf2PptxError::WrongPassword { .. }
            | Pdf2PptxError::EmptyDocument
            | Pdf2PptxError::InvalidPageSize { .. }
            | Pdf2PptxError::CanvasOutOfRange { .. }
            | Pdf2PptxError::InvalidConfig(_) => ErrorKind::InvalidInput,
            Pdf2PptxError::PermissionDenied { .. }
            | Pdf2PptxError::RasterisationFailed { .. }
            | Pdf2PptxError::TempWriteFailed { .. }
            | Pdf2PptxError::TempReadFailed { .. }
            | Pdf2PptxError::TempCleanupFailed { .. }
            | Pdf2PptxError::OutputWriteFailed { .. }
            | Pdf2PptxError::Internal(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_invalid_input() {
        let e = Pdf2PptxError::EmptyDocument;
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert!(e.to_string().contains("no pages"));
    }

    #[test]
    fn binding_failure_is_missing_dependency() {
        let e = Pdf2PptxError::PdfiumBindingFailed("libpdfium.so: not found".into());
        assert_eq!(e.kind(), ErrorKind::MissingDependency);
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn cleanup_failure_display() {
        let e = Pdf2PptxError::TempCleanupFailed {
            path: PathBuf::from("/tmp/page_3.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(e.kind(), ErrorKind::Io);
        assert!(e.to_string().contains("page_3.png"));
        assert!(e.to_string().contains("denied"));
    }

    #[test]
    fn canvas_out_of_range_display() {
        let e = Pdf2PptxError::CanvasOutOfRange {
            width_in: 10.0,
            height_in: 80.5,
        };
        assert!(e.to_string().contains("80.50in"), "got: {e}");
    }
}
