//! Document codec contract and the PDFium/qpdf implementation

use crate::error::{Error, Result};
use crate::pdf::qpdf::QpdfWrapper;
use crate::pdf::render;
use serde::{Deserialize, Serialize};

/// A parsed document ready for processing.
///
/// Holds the source bytes plus what opening them established (page count,
/// the password that unlocked them). The bytes are never mutated.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    bytes: Vec<u8>,
    page_count: u32,
    password: Option<String>,
}

impl LoadedDocument {
    pub fn new(bytes: Vec<u8>, page_count: u32, password: Option<String>) -> Self {
        Self {
            bytes,
            page_count,
            password,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Fail unless every page number lies within `1..=page_count`
    pub fn check_pages(&self, pages: &[u32]) -> Result<()> {
        for &page in pages {
            if page < 1 || page > self.page_count {
                return Err(Error::PageOutOfBounds {
                    page,
                    total: self.page_count,
                });
            }
        }
        Ok(())
    }
}

/// Raster output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Webp,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }
}

/// Colour conversion applied after rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Color,
    Grayscale,
    BlackWhite,
}

/// How big a rendered page should be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderTarget {
    /// Fixed pixel width, height follows the aspect ratio
    Width(u16),
    /// Multiple of the page size in points (1.0 = 72 dpi)
    Scale(f32),
}

/// Settings for rasterising pages
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub target: RenderTarget,
    pub format: ImageFormat,
    pub color_mode: ColorMode,
    /// JPEG quality (1-100), ignored for other formats
    pub quality: u8,
    /// Upper bound on width * height of a single rendered page
    pub max_pixels: Option<u64>,
}

impl RenderSettings {
    /// PNG thumbnails of a fixed width
    pub fn thumbnail(width: u16) -> Self {
        Self {
            target: RenderTarget::Width(width),
            format: ImageFormat::Png,
            color_mode: ColorMode::Color,
            quality: 85,
            max_pixels: None,
        }
    }
}

/// A rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Page number (1-indexed)
    pub page: u32,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Encoded image bytes
    pub data: Vec<u8>,
    /// MIME type of `data`
    pub mime_type: String,
}

/// One page of a composed output: which source, which page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRef {
    /// Index into the source list
    pub source: usize,
    /// Page number in that source (1-indexed)
    pub page: u32,
}

impl PageRef {
    pub fn new(source: usize, page: u32) -> Self {
        Self { source, page }
    }
}

/// An outline entry pointing into the composed output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub title: String,
    /// Output page number (1-indexed)
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeSettings {
    pub bookmarks: Vec<Bookmark>,
    /// Copy the document info dictionary of this source into the output
    pub metadata_from: Option<usize>,
}

/// Parameters for the lossy rewrite of a document
#[derive(Debug, Clone, PartialEq)]
pub struct ReencodeSettings {
    /// Downscale factor for embedded images; `None` leaves images untouched
    pub image_scale: Option<f32>,
    /// JPEG quality used when embedded images are re-encoded
    pub image_quality: u8,
    pub remove_metadata: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintPermission {
    #[default]
    Full,
    Low,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectSettings {
    pub user_password: String,
    pub owner_password: Option<String>,
    pub allow_print: PrintPermission,
    pub allow_copy: bool,
    pub allow_modify: bool,
}

/// What gets stamped onto every page
#[derive(Debug, Clone)]
pub enum Stamp {
    Text {
        text: String,
        font_size: f32,
        opacity: f32,
    },
    Image {
        image: image::DynamicImage,
        /// Fraction of the page width the image should cover
        width_ratio: f32,
        opacity: f32,
    },
}

/// Operations the pipeline needs from a document library.
///
/// Every method is pure with respect to its inputs: outputs are new byte
/// buffers and `LoadedDocument`s are never modified.
pub trait DocumentCodec {
    /// Parse `bytes`, failing with `DocumentUnreadable` when they are not a
    /// usable PDF or are encrypted and `password` does not open them.
    fn open(&self, bytes: &[u8], password: Option<&str>) -> Result<LoadedDocument>;

    fn page_count(&self, doc: &LoadedDocument) -> u32 {
        doc.page_count()
    }

    /// Rasterise the given pages in the given order
    fn render_pages(
        &self,
        doc: &LoadedDocument,
        pages: &[u32],
        settings: &RenderSettings,
    ) -> Result<Vec<Raster>>;

    /// New document made of `pages` (1-indexed) in the given order
    fn extract_pages(&self, doc: &LoadedDocument, pages: &[u32]) -> Result<Vec<u8>>;

    /// New document laid out by `plan`, drawing pages from `sources`
    fn compose(
        &self,
        sources: &[&LoadedDocument],
        plan: &[PageRef],
        settings: &ComposeSettings,
    ) -> Result<Vec<u8>>;

    fn reencode(&self, doc: &LoadedDocument, settings: &ReencodeSettings) -> Result<Vec<u8>>;

    fn protect(&self, doc: &LoadedDocument, settings: &ProtectSettings) -> Result<Vec<u8>>;

    fn watermark(&self, doc: &LoadedDocument, stamp: &Stamp) -> Result<Vec<u8>>;
}

/// Codec backed by qpdf (structure) and PDFium (pixels)
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCodec;

impl PdfCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCodec for PdfCodec {
    fn open(&self, bytes: &[u8], password: Option<&str>) -> Result<LoadedDocument> {
        let page_count = QpdfWrapper::get_page_count(bytes, password)?;
        Ok(LoadedDocument::new(
            bytes.to_vec(),
            page_count,
            password.map(str::to_string),
        ))
    }

    fn render_pages(
        &self,
        doc: &LoadedDocument,
        pages: &[u32],
        settings: &RenderSettings,
    ) -> Result<Vec<Raster>> {
        doc.check_pages(pages)?;
        render::render_pages(doc.bytes(), doc.password(), pages, settings)
    }

    fn extract_pages(&self, doc: &LoadedDocument, pages: &[u32]) -> Result<Vec<u8>> {
        doc.check_pages(pages)?;
        QpdfWrapper::extract_pages(doc.bytes(), pages, doc.password())
    }

    fn compose(
        &self,
        sources: &[&LoadedDocument],
        plan: &[PageRef],
        settings: &ComposeSettings,
    ) -> Result<Vec<u8>> {
        for page_ref in plan {
            let source = sources.get(page_ref.source).ok_or_else(|| Error::ProcessingFailed {
                reason: format!("plan refers to missing source {}", page_ref.source),
            })?;
            source.check_pages(&[page_ref.page])?;
        }
        let inputs: Vec<(&[u8], Option<&str>)> = sources
            .iter()
            .map(|doc| (doc.bytes(), doc.password()))
            .collect();
        QpdfWrapper::compose(&inputs, plan, settings)
    }

    fn reencode(&self, doc: &LoadedDocument, settings: &ReencodeSettings) -> Result<Vec<u8>> {
        // Image pass goes through PDFium, which saves unencrypted output
        let (data, password) = match settings.image_scale {
            Some(scale) => (
                render::reencode_images(
                    doc.bytes(),
                    doc.password(),
                    scale,
                    settings.image_quality,
                )?,
                None,
            ),
            None => (doc.bytes().to_vec(), doc.password()),
        };
        QpdfWrapper::compress(&data, password, settings.remove_metadata)
    }

    fn protect(&self, doc: &LoadedDocument, settings: &ProtectSettings) -> Result<Vec<u8>> {
        QpdfWrapper::encrypt(doc.bytes(), settings, doc.password())
    }

    fn watermark(&self, doc: &LoadedDocument, stamp: &Stamp) -> Result<Vec<u8>> {
        render::stamp_pages(doc.bytes(), doc.password(), stamp)
    }
}
