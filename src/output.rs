//! Result types returned by the conversion entry points.

use crate::canvas::{Canvas, PageSize};
use serde::Serialize;
use std::path::PathBuf;

/// How a conversion run ended, when it did not fail.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConversionOutcome {
    /// Every page is on a slide and the deck was saved.
    Completed(ConversionStats),
    /// The run stopped on request. The destination was not written.
    Cancelled {
        processed_pages: usize,
        total_pages: usize,
    },
}

impl ConversionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ConversionOutcome::Completed(_))
    }

    pub fn stats(&self) -> Option<&ConversionStats> {
        match self {
            ConversionOutcome::Completed(stats) => Some(stats),
            ConversionOutcome::Cancelled { .. } => None,
        }
    }
}

/// Statistics about a completed conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Slides in the saved deck. Always equal to `total_pages`.
    pub slides_written: usize,
    /// Slide size shared by every slide.
    pub canvas: Canvas,
    /// Resolution pages were rendered at.
    pub dpi: u32,
    /// Where the deck was saved.
    pub output_path: PathBuf,
    /// Size of the saved deck in bytes.
    pub deck_bytes: u64,
    /// 1-indexed pages whose aspect ratio differs from page 1 and are stretched.
    pub distorted_pages: Vec<usize>,
    /// Wall-clock time for the whole run, in milliseconds.
    pub total_duration_ms: u64,
    /// Time spent rasterising and encoding pages, in milliseconds.
    pub render_duration_ms: u64,
    /// Time spent writing the package, in milliseconds.
    pub save_duration_ms: u64,
}

/// What a document would convert to, without rendering anything.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub title: Option<String>,
    pub page_count: usize,
    pub first_page: PageSize,
    /// The slide size a conversion with the given config would use.
    pub canvas: Canvas,
}
