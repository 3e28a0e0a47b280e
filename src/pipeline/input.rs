//! Path checks run before any PDF is opened.
//!
//! pdfium reports a missing or non-PDF file as a generic load failure, so the
//! source is checked here first (existence, read permission, `%PDF` magic) to
//! give callers a precise error. The destination only needs a non-empty name
//! and an existing parent directory; the deck writer creates the file itself.

use crate::error::Pdf2PptxError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` names a readable PDF file.
pub fn check_source(path: &Path) -> Result<(), Pdf2PptxError> {
    if !path.is_file() {
        return Err(Pdf2PptxError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            // Files shorter than four bytes are left for pdfium to reject.
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2PptxError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2PptxError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2PptxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Source PDF ok: {}", path.display());
    Ok(())
}

/// Validate that a deck can be written to `path`.
pub fn check_destination(path: &Path) -> Result<(), Pdf2PptxError> {
    if path.as_os_str().is_empty() {
        return Err(Pdf2PptxError::OutputPathEmpty);
    }

    let parent = output_dir(path);
    if !parent.is_dir() {
        return Err(Pdf2PptxError::OutputDirMissing { path: parent });
    }
    Ok(())
}

/// Directory the deck will be written into; `.` for bare file names.
pub fn output_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Default output path for an input: same location, `.pptx` extension.
pub fn default_output_for(input: &Path) -> PathBuf {
    input.with_extension("pptx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_source_is_not_found() {
        let err = check_source(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_source(dir.path()).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"PK\x03\x04rest").unwrap();
        match check_source(&path).unwrap_err() {
            Pdf2PptxError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();
        assert!(check_source(&path).is_ok());
    }

    #[test]
    fn empty_destination_is_rejected() {
        assert!(matches!(
            check_destination(Path::new("")),
            Err(Pdf2PptxError::OutputPathEmpty)
        ));
    }

    #[test]
    fn destination_needs_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_destination(&dir.path().join("out.pptx")).is_ok());

        let err = check_destination(&dir.path().join("missing/out.pptx")).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::OutputDirMissing { .. }));
    }

    #[test]
    fn bare_file_name_lives_in_cwd() {
        assert_eq!(output_dir(Path::new("deck.pptx")), PathBuf::from("."));
        assert!(check_destination(Path::new("deck.pptx")).is_ok());
    }

    #[test]
    fn default_output_swaps_extension() {
        assert_eq!(
            default_output_for(Path::new("/docs/report.pdf")),
            PathBuf::from("/docs/report.pptx")
        );
    }
}
