//! Pipeline stages for PDF-to-deck conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ source ──▶ raster ──▶ deck
//! (checks)  (pdfium)   (temp PNG)  (slide)
//! ```
//!
//! 1. [`input`]: validate the source and destination paths
//! 2. [`source`]: page sizes and rasterisation behind the [`source::PageSource`] trait
//! 3. [`raster`]: stage each page image in a temporary PNG, then discard it
//!
//! The deck itself lives in [`crate::deck`].

pub mod input;
pub mod raster;
pub mod source;
