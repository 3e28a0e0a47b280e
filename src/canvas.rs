//! Slide canvas geometry.
//!
//! The canvas is fixed once per conversion from the first page's aspect
//! ratio and the configured width. Every slide uses it, including pages
//! whose own ratio differs; those pages are stretched to fit.

use crate::error::Pdf2PptxError;
use serde::Serialize;

/// English Metric Units per inch, the PresentationML length unit.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// Smallest slide side PresentationML accepts (1 in).
pub const MIN_SLIDE_EMU: i64 = 914_400;

/// Largest slide side PresentationML accepts (56 in).
pub const MAX_SLIDE_EMU: i64 = 51_206_400;

/// Relative aspect-ratio difference above which a page counts as distorted.
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// Intrinsic size of a source page, in PDF points (1/72 in).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Height divided by width.
    pub fn aspect_ratio(&self) -> f64 {
        self.height as f64 / self.width as f64
    }

    pub(crate) fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Width and height of every slide in the output deck, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width_in: f64,
    pub height_in: f64,
}

impl Canvas {
    /// Derive the canvas from page 1: `height = width * (page.height / page.width)`.
    pub fn from_first_page(width_in: f64, page: PageSize) -> Result<Self, Pdf2PptxError> {
        if !page.is_usable() {
            return Err(Pdf2PptxError::InvalidPageSize {
                page: 1,
                width: page.width,
                height: page.height,
            });
        }

        let canvas = Self {
            width_in,
            height_in: width_in * page.aspect_ratio(),
        };

        let in_range = |emu: i64| (MIN_SLIDE_EMU..=MAX_SLIDE_EMU).contains(&emu);
        if !in_range(canvas.width_emu()) || !in_range(canvas.height_emu()) {
            return Err(Pdf2PptxError::CanvasOutOfRange {
                width_in: canvas.width_in,
                height_in: canvas.height_in,
            });
        }

        Ok(canvas)
    }

    pub fn width_emu(&self) -> i64 {
        inches_to_emu(self.width_in)
    }

    pub fn height_emu(&self) -> i64 {
        inches_to_emu(self.height_in)
    }

    /// Height divided by width.
    pub fn aspect_ratio(&self) -> f64 {
        self.height_in / self.width_in
    }

    /// Whether `page` would be visibly stretched on this canvas.
    pub fn distorts(&self, page: PageSize) -> bool {
        let ratio = page.aspect_ratio();
        ((ratio - self.aspect_ratio()) / self.aspect_ratio()).abs() > ASPECT_TOLERANCE
    }
}

/// Convert inches to EMU, rounding to the nearest unit.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn us_letter_at_ten_inches() {
        let canvas = Canvas::from_first_page(10.0, PageSize::new(612.0, 792.0)).unwrap();
        assert_eq!(canvas.width_in, 10.0);
        assert!((canvas.height_in - 12.941_176).abs() < 1e-5, "{canvas:?}");
        assert_eq!(canvas.width_emu(), 9_144_000);
        assert_eq!(canvas.height_emu(), 11_833_412);
    }

    #[test]
    fn landscape_sixteen_by_nine() {
        let canvas = Canvas::from_first_page(13.333, PageSize::new(960.0, 540.0)).unwrap();
        assert!((canvas.height_in - 7.499_812_5).abs() < 1e-6);
    }

    #[test]
    fn ratio_holds_for_any_width() {
        let page = PageSize::new(595.0, 842.0);
        for w in [5.0, 7.5, 10.0, 12.25, 15.0] {
            let c = Canvas::from_first_page(w, page).unwrap();
            assert!((c.height_in - w * (842.0 / 595.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_width_page_is_rejected() {
        let err = Canvas::from_first_page(10.0, PageSize::new(0.0, 792.0)).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::InvalidPageSize { page: 1, .. }));
    }

    #[test]
    fn extremely_tall_page_overflows_canvas() {
        // 1:10 strip → 100 in tall at 10 in wide.
        let err = Canvas::from_first_page(10.0, PageSize::new(100.0, 1000.0)).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::CanvasOutOfRange { .. }));
    }

    #[test]
    fn distortion_detection() {
        let canvas = Canvas::from_first_page(10.0, PageSize::new(612.0, 792.0)).unwrap();
        assert!(!canvas.distorts(PageSize::new(612.0, 792.0)));
        assert!(!canvas.distorts(PageSize::new(306.0, 396.0)));
        assert!(canvas.distorts(PageSize::new(792.0, 612.0)));
    }
}
