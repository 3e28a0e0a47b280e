//! End-to-end tests against a real PDFium library.
//!
//! Fixture PDFs are generated with PDFium itself, so no files need to be
//! downloaded. Any `*.pdf` dropped into `./test_cases/` is converted as well.
//! Gated behind `E2E_ENABLED` because the PDFium shared library must be
//! installed.
//!
//! Run with:
//!   E2E_ENABLED=1 LD_LIBRARY_PATH=. cargo test --test e2e -- --nocapture

use pdf2pptx::engine::bind_pdfium;
use pdf2pptx::{
    convert, convert_file, inspect, CancellationToken, ConversionConfig, ErrorKind,
};
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Write a PDF with one blank page per `(width, height)` in points.
fn write_fixture(path: &Path, pages: &[(f32, f32)]) {
    let pdfium = bind_pdfium().expect("PDFium should bind when E2E_ENABLED is set");
    let mut document = pdfium.create_new_pdf().expect("create document");
    for &(w, h) in pages {
        document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::from_points(
                PdfPoints::new(w),
                PdfPoints::new(h),
            ))
            .expect("add page");
    }
    document.save_to_file(path).expect("save fixture");
}

fn slide_count(deck: &Path) -> usize {
    let file = std::fs::File::open(deck).expect("deck exists");
    let archive = zip::ZipArchive::new(file).expect("deck is a zip");
    archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count()
}

fn read_part(deck: &Path, name: &str) -> String {
    let file = std::fs::File::open(deck).expect("deck exists");
    let mut archive = zip::ZipArchive::new(file).expect("deck is a zip");
    let mut part = archive.by_name(name).expect("part exists");
    let mut xml = String::new();
    part.read_to_string(&mut xml).expect("utf-8 part");
    xml
}

const LETTER: (f32, f32) = (612.0, 792.0);

// ── Inspect ──────────────────────────────────────────────────────────────────

#[test]
fn test_inspect_generated_letter() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("letter.pdf");
    write_fixture(&pdf, &[LETTER, LETTER, LETTER]);

    let info = inspect(&pdf, &ConversionConfig::default()).expect("inspect should succeed");
    assert_eq!(info.page_count, 3);
    assert!((info.first_page.width - 612.0).abs() < 0.5);
    assert!((info.canvas.width_in - 10.0).abs() < 1e-9);
    assert!((info.canvas.height_in - 10.0 * 792.0 / 612.0).abs() < 1e-3);
    println!("Info: {:?}", info);
}

#[test]
fn test_inspect_nonexistent() {
    e2e_skip_unless_enabled!();
    let err = inspect("/definitely/not/a/real/file.pdf", &ConversionConfig::default())
        .expect_err("missing file");
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_truncated_pdf_is_corrupt() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("broken.pdf");
    std::fs::write(&pdf, b"%PDF-1.7\n1 0 obj\n<< /Type /Catalog").unwrap();

    let err = inspect(&pdf, &ConversionConfig::default()).expect_err("corrupt file");
    assert!(err.to_string().contains("corrupt"), "got: {err}");
}

// ── Conversion ───────────────────────────────────────────────────────────────

#[test]
fn test_convert_generated_letter() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("letter.pdf");
    let deck = dir.path().join("letter.pptx");
    write_fixture(&pdf, &[LETTER, LETTER, LETTER]);

    let config = ConversionConfig::builder().dpi(150).build().unwrap();
    let outcome = convert_file(&pdf, &deck, &config, &CancellationToken::new())
        .expect("conversion should succeed");
    let stats = outcome.stats().expect("completed");

    assert_eq!(stats.slides_written, 3);
    assert_eq!(slide_count(&deck), 3);
    assert!(stats.distorted_pages.is_empty());
    assert!(read_part(&deck, "ppt/presentation.xml").contains("cx=\"9144000\""));

    // Only the source and the deck are left behind.
    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["letter.pdf", "letter.pptx"]);
    println!("Stats: {}", serde_json::to_string_pretty(stats).unwrap());
}

#[test]
fn test_convert_mixed_orientation_stretches() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("mixed.pdf");
    let deck = dir.path().join("mixed.pptx");
    write_fixture(&pdf, &[LETTER, (792.0, 612.0), LETTER]);

    let config = ConversionConfig::builder().dpi(150).build().unwrap();
    let outcome = convert_file(&pdf, &deck, &config, &CancellationToken::new()).unwrap();
    let stats = outcome.stats().expect("completed");
    assert_eq!(stats.slides_written, 3);
    assert_eq!(stats.distorted_pages, vec![2]);
}

#[test]
fn test_convert_cancelled_writes_nothing() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("letter.pdf");
    let deck = dir.path().join("letter.pptx");
    write_fixture(&pdf, &[LETTER, LETTER]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = convert_file(&pdf, &deck, &ConversionConfig::default(), &cancel).unwrap();
    assert!(!outcome.is_completed());
    assert!(!deck.exists());
}

#[tokio::test]
async fn test_convert_async() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("a4.pdf");
    let deck = dir.path().join("a4.pptx");
    write_fixture(&pdf, &[(595.0, 842.0)]);

    let config = ConversionConfig::builder()
        .dpi(150)
        .slide_width_in(13.333)
        .build()
        .unwrap();
    let outcome = convert(&pdf, &deck, &config, &CancellationToken::new())
        .await
        .expect("async conversion should succeed");
    let stats = outcome.stats().expect("completed");
    assert_eq!(stats.slides_written, 1);
    assert!((stats.canvas.height_in - 13.333 * 842.0 / 595.0).abs() < 1e-3);
}

// ── Real-world documents ─────────────────────────────────────────────────────

/// Converts every PDF found in `test_cases/`, if any.
#[test]
fn test_convert_test_cases() {
    e2e_skip_unless_enabled!();
    let Ok(entries) = std::fs::read_dir(test_cases_dir()) else {
        println!("SKIP — no test_cases/ directory");
        return;
    };
    let out = tempfile::tempdir().unwrap();
    let config = ConversionConfig::builder().dpi(150).build().unwrap();

    for entry in entries {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
            continue;
        }
        let info = inspect(&path, &config).expect("inspect");
        let deck = out
            .path()
            .join(path.with_extension("pptx").file_name().unwrap());
        let outcome = convert_file(&path, &deck, &config, &CancellationToken::new())
            .unwrap_or_else(|e| panic!("{}: {e}", path.display()));
        let stats = outcome.stats().expect("completed");

        assert_eq!(stats.slides_written, info.page_count);
        assert_eq!(slide_count(&deck), info.page_count);
        println!(
            "✓ {} — {} slides, {} bytes",
            path.display(),
            stats.slides_written,
            stats.deck_bytes
        );
    }
}
