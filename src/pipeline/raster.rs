//! Transient page images.
//!
//! Each rendered page is encoded to PNG in a uniquely named temporary file,
//! handed to the deck, then removed. [`StagedRaster::discard`] reports a
//! failed removal; dropping the handle on an error path removes the file
//! best-effort.

use crate::error::Pdf2PptxError;
use image::{DynamicImage, ImageFormat};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A page image persisted to a temporary PNG file.
#[derive(Debug)]
pub struct StagedRaster {
    file: NamedTempFile,
    bytes: u64,
}

impl StagedRaster {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Encoded size in bytes.
    pub fn byte_len(&self) -> u64 {
        self.bytes
    }

    /// Delete the temporary file.
    pub fn discard(self) -> Result<(), Pdf2PptxError> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|source| Pdf2PptxError::TempCleanupFailed { path, source })
    }
}

/// Encode `image` as PNG into a fresh `page_<n>_*.png` file under `dir`.
pub fn stage_page(
    image: &DynamicImage,
    page_num: usize,
    dir: &Path,
) -> Result<StagedRaster, Pdf2PptxError> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("page_{page_num}_"))
        .suffix(".png")
        .tempfile_in(dir)
        .map_err(|e| Pdf2PptxError::TempWriteFailed {
            page: page_num,
            path: dir.to_path_buf(),
            detail: e.to_string(),
        })?;

    let write_failed = |detail: String, path: &Path| Pdf2PptxError::TempWriteFailed {
        page: page_num,
        path: path.to_path_buf(),
        detail,
    };

    let path = file.path().to_path_buf();
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        image
            .write_to(&mut writer, ImageFormat::Png)
            .map_err(|e| write_failed(e.to_string(), &path))?;
        writer
            .flush()
            .map_err(|e| write_failed(e.to_string(), &path))?;
    }

    let bytes = file
        .as_file()
        .metadata()
        .map(|m| m.len())
        .map_err(|e| write_failed(e.to_string(), &path))?;

    Ok(StagedRaster { file, bytes })
}
