//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the conversion routine processes each page. The CLI drives an
//! `indicatif` bar from it; the interactive shell forwards events to its UI
//! thread over a channel (see [`crate::job`]).
//!
//! # Example
//!
//! ```rust
//! use pdf2pptx::{Canvas, ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct SlideLog(Mutex<Vec<String>>);
//!
//! impl ConversionProgressCallback for SlideLog {
//!     fn on_conversion_start(&self, total_pages: usize, canvas: &Canvas) {
//!         let line = format!("{total_pages} slides at {:.2}in wide", canvas.width_in);
//!         self.0.lock().unwrap().push(line);
//!     }
//!
//!     fn on_page_complete(&self, page_num: usize, _total_pages: usize, image_bytes: u64) {
//!         self.0.lock().unwrap().push(format!("slide {page_num}: {image_bytes} bytes"));
//!     }
//! }
//!
//! let log = Arc::new(SlideLog::default());
//! let config = ConversionConfig::builder()
//!     .progress_callback(log.clone())
//!     .build()
//!     .unwrap();
//! ```

use crate::canvas::Canvas;
use std::path::Path;
use std::sync::Arc;

/// Called by the conversion routine as it processes each page.
///
/// Pages are processed strictly in order on one thread, but the callback is
/// usually owned by another thread (UI, progress bar), hence `Send + Sync`.
/// All methods have default no-op implementations.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the canvas is known, before the first page is rendered.
    ///
    /// # Arguments
    /// * `total_pages`: pages in the document
    /// * `canvas`: slide size applied to every slide
    fn on_conversion_start(&self, total_pages: usize, canvas: &Canvas) {
        let _ = (total_pages, canvas);
    }

    /// Called just before a page is rasterised.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page is on its slide and its temporary image is gone.
    ///
    /// # Arguments
    /// * `page_num`: 1-indexed page number
    /// * `total_pages`: total pages
    /// * `image_bytes`: size of the encoded page image embedded in the deck
    fn on_page_complete(&self, page_num: usize, total_pages: usize, image_bytes: u64) {
        let _ = (page_num, total_pages, image_bytes);
    }

    /// Called when the run stops on a cancellation request. The deck is not saved.
    ///
    /// # Arguments
    /// * `processed_pages`: pages that made it onto a slide
    /// * `total_pages`: total pages
    fn on_cancelled(&self, processed_pages: usize, total_pages: usize) {
        let _ = (processed_pages, total_pages);
    }

    /// Called once after the deck has been saved.
    fn on_conversion_complete(&self, total_pages: usize, output: &Path) {
        let _ = (total_pages, output);
    }
}

/// Ignores every event. Handy where a callback is required but unwanted.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Shared handle stored in [`crate::config::ConversionConfig::progress_callback`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageSize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        cancelled_at: AtomicUsize,
        started_total: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_pages: usize, _canvas: &Canvas) {
            self.started_total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_start(&self, _page_num: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _image_bytes: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_cancelled(&self, processed_pages: usize, _total_pages: usize) {
            self.cancelled_at.store(processed_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let canvas = Canvas::from_first_page(10.0, PageSize::new(612.0, 792.0)).unwrap();
        let cb = NoopProgressCallback;
        cb.on_conversion_start(5, &canvas);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 42);
        cb.on_cancelled(1, 5);
        cb.on_conversion_complete(5, Path::new("out.pptx"));
    }

    #[test]
    fn tracking_callback_receives_events() {
        let canvas = Canvas::from_first_page(10.0, PageSize::new(612.0, 792.0)).unwrap();
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(3, &canvas);
        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);

        tracker.on_page_start(1, 3);
        tracker.on_page_complete(1, 3, 100);
        tracker.on_page_start(2, 3);
        tracker.on_page_complete(2, 3, 200);
        tracker.on_cancelled(2, 3);

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.cancelled_at.load(Ordering::SeqCst), 2);
    }
}
