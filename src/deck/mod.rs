//! In-memory slide deck and its PresentationML (`.pptx`) writer.
//!
//! The deck is built slide by slide and written exactly once by
//! [`Deck::save`]. Nothing touches the destination until then, so a run that
//! fails or is cancelled simply drops the deck and leaves no output behind.
//!
//! ## Package layout
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/core.xml, docProps/app.xml
//! ppt/presentation.xml              sldSz = canvas
//! ppt/_rels/presentation.xml.rels
//! ppt/slideMasters/slideMaster1.xml (+ rels)
//! ppt/slideLayouts/slideLayout1.xml (+ rels, blank layout)
//! ppt/theme/theme1.xml
//! ppt/presProps.xml, viewProps.xml, tableStyles.xml
//! ppt/slides/slideN.xml (+ rels)    one <p:pic> each
//! ppt/media/imageN.png
//! ```

mod parts;

use crate::canvas::Canvas;
use crate::error::Pdf2PptxError;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A picture placed on a slide. Offsets and extents are in EMU.
#[derive(Debug, Clone)]
pub struct Picture {
    /// Encoded PNG bytes.
    pub(crate) data: Vec<u8>,
    /// Alt text; the source file name of the image.
    pub description: String,
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Picture {
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// One slide of the deck, built on the blank layout.
#[derive(Debug, Clone, Default)]
pub struct Slide {
    pictures: Vec<Picture>,
}

impl Slide {
    /// Place a PNG image read from `path` at the given EMU rectangle.
    ///
    /// The bytes are copied into the deck, so the file may be deleted as soon
    /// as this returns.
    pub fn place_picture(
        &mut self,
        path: &Path,
        x: i64,
        y: i64,
        cx: i64,
        cy: i64,
    ) -> Result<&Picture, Pdf2PptxError> {
        let data = std::fs::read(path).map_err(|e| Pdf2PptxError::TempReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        let description = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.pictures.push(Picture {
            data,
            description,
            x,
            y,
            cx,
            cy,
        });
        Ok(&self.pictures[self.pictures.len() - 1])
    }

    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }
}

/// Document properties written to `docProps/core.xml`.
#[derive(Debug, Clone)]
pub struct DeckProperties {
    pub title: Option<String>,
    pub creator: String,
    pub created: DateTime<Utc>,
}

impl Default for DeckProperties {
    fn default() -> Self {
        Self {
            title: None,
            creator: concat!("pdf2pptx ", env!("CARGO_PKG_VERSION")).to_string(),
            created: Utc::now(),
        }
    }
}

/// An ordered sequence of slides sharing one canvas.
#[derive(Debug, Clone)]
pub struct Deck {
    canvas: Canvas,
    slides: Vec<Slide>,
    properties: DeckProperties,
}

impl Deck {
    /// Create an empty deck whose slides are all `canvas`-sized.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            slides: Vec::new(),
            properties: DeckProperties::default(),
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.properties.title = Some(title.into());
    }

    pub fn properties(&self) -> &DeckProperties {
        &self.properties
    }

    /// Append a new blank slide and return it.
    pub fn add_slide(&mut self) -> &mut Slide {
        self.slides.push(Slide::default());
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Write the deck to `path`, replacing any existing file.
    ///
    /// The package is written to `<path>.tmp` first and renamed into place,
    /// so readers never observe a half-written deck. Returns the size of the
    /// written file in bytes.
    pub fn save(&self, path: &Path) -> Result<u64, Pdf2PptxError> {
        let tmp_path = tmp_path_for(path);
        let write_err = |e: std::io::Error| Pdf2PptxError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        };

        let result = File::create(&tmp_path)
            .map_err(write_err)
            .and_then(|file| self.write_package(BufWriter::new(file)).map_err(write_err));

        if let Err(e) = result {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e);
        }

        std::fs::rename(&tmp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            write_err(e)
        })?;

        let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        debug!(
            "Saved deck → {} ({} slides, {} bytes)",
            path.display(),
            self.slides.len(),
            size
        );
        Ok(size)
    }

    /// Serialise the whole package into `writer`.
    pub fn write_package<W: Write + std::io::Seek>(&self, writer: W) -> std::io::Result<()> {
        let mut zip = ZipWriter::new(writer);
        let xml = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        // PNG is already compressed.
        let media = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let slide_count = self.slides.len();
        put_part(
            &mut zip,
            "[Content_Types].xml",
            xml,
            parts::content_types_xml(slide_count).as_bytes(),
        )?;
        put_part(&mut zip, "_rels/.rels", xml, parts::ROOT_RELS.as_bytes())?;
        put_part(
            &mut zip,
            "docProps/core.xml",
            xml,
            parts::core_props_xml(&self.properties).as_bytes(),
        )?;
        put_part(
            &mut zip,
            "docProps/app.xml",
            xml,
            parts::app_props_xml(slide_count).as_bytes(),
        )?;
        put_part(
            &mut zip,
            "ppt/presentation.xml",
            xml,
            parts::presentation_xml(&self.canvas, slide_count).as_bytes(),
        )?;
        put_part(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            xml,
            parts::presentation_rels_xml(slide_count).as_bytes(),
        )?;
        put_part(
            &mut zip,
            "ppt/slideMasters/slideMaster1.xml",
            xml,
            parts::SLIDE_MASTER.as_bytes(),
        )?;
        put_part(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            xml,
            parts::SLIDE_MASTER_RELS.as_bytes(),
        )?;
        put_part(
            &mut zip,
            "ppt/slideLayouts/slideLayout1.xml",
            xml,
            parts::SLIDE_LAYOUT_BLANK.as_bytes(),
        )?;
        put_part(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            xml,
            parts::SLIDE_LAYOUT_RELS.as_bytes(),
        )?;
        put_part(&mut zip, "ppt/theme/theme1.xml", xml, parts::THEME.as_bytes())?;
        put_part(&mut zip, "ppt/presProps.xml", xml, parts::PRES_PROPS.as_bytes())?;
        put_part(&mut zip, "ppt/viewProps.xml", xml, parts::VIEW_PROPS.as_bytes())?;
        put_part(
            &mut zip,
            "ppt/tableStyles.xml",
            xml,
            parts::TABLE_STYLES.as_bytes(),
        )?;

        let mut image_no = 0usize;
        for (i, slide) in self.slides.iter().enumerate() {
            let slide_no = i + 1;
            let mut media_names = Vec::with_capacity(slide.pictures.len());
            for picture in &slide.pictures {
                image_no += 1;
                let name = format!("image{image_no}.png");
                put_part(&mut zip, &format!("ppt/media/{name}"), media, &picture.data)?;
                media_names.push(name);
            }
            put_part(
                &mut zip,
                &format!("ppt/slides/slide{slide_no}.xml"),
                xml,
                parts::slide_xml(&slide.pictures).as_bytes(),
            )?;
            put_part(
                &mut zip,
                &format!("ppt/slides/_rels/slide{slide_no}.xml.rels"),
                xml,
                parts::slide_rels_xml(&media_names).as_bytes(),
            )?;
        }

        zip.finish().map_err(zip_to_io)?;
        Ok(())
    }
}

fn put_part<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    options: SimpleFileOptions,
    bytes: &[u8],
) -> std::io::Result<()> {
    zip.start_file(name, options).map_err(zip_to_io)?;
    zip.write_all(bytes)
}

fn zip_to_io(e: zip::result::ZipError) -> std::io::Error {
    match e {
        zip::result::ZipError::Io(io) => io,
        other => std::io::Error::other(other.to_string()),
    }
}

/// `deck.pptx` → `deck.pptx.tmp`, in the same directory so the rename is atomic.
fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "deck.pptx".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::PageSize;
    use std::io::{Cursor, Read};

    fn letter_canvas() -> Canvas {
        Canvas::from_first_page(10.0, PageSize::new(612.0, 792.0)).unwrap()
    }

    fn read_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut s = String::new();
        entry.read_to_string(&mut s).unwrap();
        s
    }

    fn deck_with_pictures(n: usize, dir: &Path) -> Deck {
        let canvas = letter_canvas();
        let mut deck = Deck::new(canvas);
        for i in 0..n {
            let img = dir.join(format!("p{i}.png"));
            std::fs::write(&img, b"\x89PNG\r\n\x1a\nfake").unwrap();
            deck.add_slide()
                .place_picture(&img, 0, 0, canvas.width_emu(), canvas.height_emu())
                .unwrap();
        }
        deck
    }

    #[test]
    fn empty_deck_has_no_slide_list() {
        let deck = Deck::new(letter_canvas());
        let mut buf = Cursor::new(Vec::new());
        deck.write_package(&mut buf).unwrap();
        let bytes = buf.into_inner();

        let pres = read_entry(&bytes, "ppt/presentation.xml");
        assert!(!pres.contains("<p:sldIdLst>"));
        assert!(pres.contains(r#"<p:sldSz cx="9144000" cy="11833412"/>"#));
    }

    #[test]
    fn slides_and_media_are_numbered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let deck = deck_with_pictures(3, dir.path());
        let mut buf = Cursor::new(Vec::new());
        deck.write_package(&mut buf).unwrap();
        let bytes = buf.into_inner();

        let archive = zip::ZipArchive::new(Cursor::new(&bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for n in 1..=3 {
            assert!(names.contains(&format!("ppt/slides/slide{n}.xml").as_str()));
            assert!(names.contains(&format!("ppt/media/image{n}.png").as_str()));
        }

        let rels = read_entry(&bytes, "ppt/slides/_rels/slide2.xml.rels");
        assert!(rels.contains(r#"Target="../media/image2.png""#));

        let types = read_entry(&bytes, "[Content_Types].xml");
        assert!(types.contains("/ppt/slides/slide3.xml"));
        assert!(types.contains(r#"Extension="png""#));
    }

    #[test]
    fn picture_fills_the_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let deck = deck_with_pictures(1, dir.path());
        let mut buf = Cursor::new(Vec::new());
        deck.write_package(&mut buf).unwrap();
        let slide = read_entry(&buf.into_inner(), "ppt/slides/slide1.xml");
        assert_eq!(slide.matches("<p:pic>").count(), 1);
        assert!(slide.contains(r#"<a:off x="0" y="0"/><a:ext cx="9144000" cy="11833412"/>"#));
    }

    #[test]
    fn save_replaces_existing_file_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("deck.pptx");
        std::fs::write(&out, b"old contents").unwrap();

        let deck = deck_with_pictures(2, dir.path());
        let size = deck.save(&out).unwrap();

        assert!(size > 0);
        assert!(!dir.path().join("deck.pptx.tmp").exists());
        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nope").join("deck.pptx");
        let err = Deck::new(letter_canvas()).save(&out).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::OutputWriteFailed { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn title_is_escaped_in_core_properties() {
        let mut deck = Deck::new(letter_canvas());
        deck.set_title("Q&A <draft>");
        let mut buf = Cursor::new(Vec::new());
        deck.write_package(&mut buf).unwrap();
        let core = read_entry(&buf.into_inner(), "docProps/core.xml");
        assert!(core.contains("<dc:title>Q&amp;A &lt;draft&gt;</dc:title>"));
    }

    #[test]
    fn tmp_path_keeps_directory() {
        assert_eq!(
            tmp_path_for(Path::new("/a/b/deck.pptx")),
            PathBuf::from("/a/b/deck.pptx.tmp")
        );
    }
}
