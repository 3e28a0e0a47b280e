//! Configuration types for PDF-to-deck conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Paths are not part of the config; they
//! are arguments of the `convert*` functions, so one config can drive many
//! runs.

use crate::error::Pdf2PptxError;
use crate::progress::ProgressCallback;
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Accepted rendering resolutions, in dots per inch.
pub const DPI_RANGE: RangeInclusive<u32> = 150..=600;

/// Accepted slide widths, in inches.
pub const WIDTH_RANGE: RangeInclusive<f64> = 5.0..=15.0;

/// Default rendering resolution.
pub const DEFAULT_DPI: u32 = 300;

/// Default slide width in inches.
pub const DEFAULT_SLIDE_WIDTH_IN: f64 = 10.0;

/// Configuration for a PDF-to-deck conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2pptx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(200)
///     .slide_width_in(13.333)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 200);
/// ```
#[derive(Clone, Serialize)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 150–600. Default: 300.
    ///
    /// Every page becomes a bitmap, so this is the only knob for sharpness.
    /// A US Letter page at 300 DPI is 2550 × 3300 px.
    pub dpi: u32,

    /// Slide width in inches. Range: 5.0–15.0. Default: 10.0.
    ///
    /// The slide height follows from the first page's aspect ratio.
    pub slide_width_in: f64,

    /// PDF user password for encrypted documents.
    #[serde(skip)]
    pub password: Option<String>,

    /// Directory for the per-page temporary images.
    /// Default: the directory of the output file.
    pub temp_dir: Option<PathBuf>,

    /// Per-page progress events.
    #[serde(skip)]
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_DPI,
            slide_width_in: DEFAULT_SLIDE_WIDTH_IN,
            password: None,
            temp_dir: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("slide_width_in", &self.slide_width_in)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("temp_dir", &self.temp_dir)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check the numeric fields against their accepted ranges.
    ///
    /// The builder clamps, but the fields are public, so the conversion
    /// routine validates again before touching the source.
    pub fn validate(&self) -> Result<(), Pdf2PptxError> {
        if !DPI_RANGE.contains(&self.dpi) {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "DPI must be {}–{}, got {}",
                DPI_RANGE.start(),
                DPI_RANGE.end(),
                self.dpi
            )));
        }
        if !WIDTH_RANGE.contains(&self.slide_width_in) {
            return Err(Pdf2PptxError::InvalidConfig(format!(
                "Slide width must be {}–{} inches, got {}",
                WIDTH_RANGE.start(),
                WIDTH_RANGE.end(),
                self.slide_width_in
            )));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(*DPI_RANGE.start(), *DPI_RANGE.end());
        self
    }

    pub fn slide_width_in(mut self, inches: f64) -> Self {
        self.config.slide_width_in = if inches.is_nan() {
            DEFAULT_SLIDE_WIDTH_IN
        } else {
            inches.clamp(*WIDTH_RANGE.start(), *WIDTH_RANGE.end())
        };
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2PptxError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 300);
        assert_eq!(c.slide_width_in, 10.0);
        assert!(c.password.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ConversionConfig::builder()
            .dpi(72)
            .slide_width_in(40.0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 150);
        assert_eq!(c.slide_width_in, 15.0);

        let c = ConversionConfig::builder().dpi(1200).build().unwrap();
        assert_eq!(c.dpi, 600);
    }

    #[test]
    fn nan_width_falls_back_to_default() {
        let c = ConversionConfig::builder()
            .slide_width_in(f64::NAN)
            .build()
            .unwrap();
        assert_eq!(c.slide_width_in, DEFAULT_SLIDE_WIDTH_IN);
    }

    #[test]
    fn validate_rejects_direct_field_edits() {
        let c = ConversionConfig {
            dpi: 100,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(Pdf2PptxError::InvalidConfig(_))));

        let c = ConversionConfig {
            slide_width_in: 4.0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(Pdf2PptxError::InvalidConfig(_))));
    }

    #[test]
    fn debug_redacts_password() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("redacted"));
    }

    #[test]
    fn serialises_without_secrets() {
        let c = ConversionConfig::builder().password("hunter2").build().unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"dpi\":300"));
        assert!(!json.contains("hunter2"));
    }
}
