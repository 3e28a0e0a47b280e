//! # pdf2pptx
//!
//! Convert PDF documents into slide decks (`.pptx`), one page per slide.
//!
//! Each page is rasterised with PDFium and placed as a single full-bleed
//! picture on its own slide. Text and vectors are not preserved; the deck
//! looks exactly like the PDF and is as editable as a photo of it.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Check    source exists and starts with %PDF; destination dir exists
//!  ├─ 2. Canvas   slide width from config, height from page 1's aspect ratio
//!  ├─ 3. Per page rasterise → temporary PNG → new slide → delete temp file
//!  └─ 4. Save     write the package once, via <output>.tmp + rename
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2pptx::{convert_file, CancellationToken, ConversionConfig, ConversionOutcome};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder().dpi(200).build()?;
//!     let outcome = convert_file("handout.pdf", "handout.pptx", &config, &CancellationToken::new())?;
//!     if let ConversionOutcome::Completed(stats) = outcome {
//!         eprintln!("{} slides, {} bytes", stats.slides_written, stats.deck_bytes);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2pptx` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `shell` | on      | Enables the `pdf2pptx-shell` terminal form (crossterm) |
//!
//! Disable both when using only the library:
//! ```toml
//! pdf2pptx = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDFium
//!
//! The PDFium shared library is loaded at runtime; see [`engine`] for the
//! lookup order. `PDFIUM_LIB_PATH` overrides it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod cancel;
pub mod canvas;
pub mod config;
pub mod convert;
pub mod deck;
pub mod engine;
pub mod error;
pub mod job;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod shell;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use cancel::CancellationToken;
pub use canvas::{Canvas, PageSize};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_document, convert_file, describe_document, inspect};
pub use deck::Deck;
pub use error::{ErrorKind, Pdf2PptxError};
pub use output::{ConversionOutcome, ConversionStats, DocumentInfo};
pub use pipeline::source::{PageSource, PdfiumSource};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
