//! Typed per-tool processing options
//!
//! Each tool has its own options type. Values are deserialized at the
//! boundary and checked with `validate` before reaching the assembler.

use crate::error::{Error, Result};
use crate::pdf::{ColorMode, ImageFormat, PageRef, PrintPermission, ReencodeSettings};
use serde::{Deserialize, Serialize};

/// Lowest accepted render resolution
pub const MIN_DPI: u32 = 36;
/// Highest accepted render resolution
pub const MAX_DPI: u32 = 600;

fn invalid(reason: impl Into<String>) -> Error {
    Error::InvalidOptions {
        reason: reason.into(),
    }
}

/// How one document is split
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "split_mode", rename_all = "snake_case")]
pub enum SplitMode {
    /// One single-page document per listed page
    #[serde(rename = "pages")]
    SelectedPages { pages: Vec<u32> },
    /// One document per comma-separated range group
    #[serde(rename = "range")]
    Ranges { ranges: String },
    /// `equal_parts` contiguous documents of near-equal size
    #[serde(rename = "size")]
    EqualParts { equal_parts: u32 },
}

impl SplitMode {
    pub fn validate(&self) -> Result<()> {
        match self {
            SplitMode::SelectedPages { pages } => {
                if pages.contains(&0) {
                    return Err(invalid("page numbers start at 1"));
                }
                Ok(())
            }
            SplitMode::Ranges { ranges } => {
                if ranges.trim().is_empty() {
                    return Err(invalid("ranges must not be empty"));
                }
                Ok(())
            }
            SplitMode::EqualParts { equal_parts } => {
                if *equal_parts < 2 {
                    return Err(invalid("equal_parts must be at least 2"));
                }
                Ok(())
            }
        }
    }
}

/// Page order of a merge
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "merge_mode", rename_all = "snake_case")]
pub enum MergeMode {
    /// All pages of document 1, then document 2, ...
    #[default]
    Sequential,
    /// One page from each document in turn
    Interleave,
    /// Explicit `(document index, page)` order
    Custom { order: Vec<PageRef> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawMergeOptions")]
pub struct MergeOptions {
    #[serde(flatten)]
    pub mode: MergeMode,
    pub add_bookmarks: bool,
    pub preserve_metadata: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum MergeModeTag {
    Sequential,
    Interleave,
    Custom,
}

/// Wire form of `MergeOptions`; `merge_mode` may be omitted
#[derive(Deserialize)]
struct RawMergeOptions {
    #[serde(default)]
    merge_mode: Option<MergeModeTag>,
    #[serde(default)]
    order: Option<Vec<PageRef>>,
    #[serde(default)]
    add_bookmarks: bool,
    #[serde(default)]
    preserve_metadata: bool,
}

impl TryFrom<RawMergeOptions> for MergeOptions {
    type Error = String;

    fn try_from(raw: RawMergeOptions) -> std::result::Result<Self, Self::Error> {
        let mode = match raw.merge_mode.unwrap_or(MergeModeTag::Sequential) {
            MergeModeTag::Sequential => MergeMode::Sequential,
            MergeModeTag::Interleave => MergeMode::Interleave,
            MergeModeTag::Custom => MergeMode::Custom {
                order: raw
                    .order
                    .ok_or_else(|| "custom merge requires an order".to_string())?,
            },
        };
        Ok(Self {
            mode,
            add_bookmarks: raw.add_bookmarks,
            preserve_metadata: raw.preserve_metadata,
        })
    }
}

impl MergeOptions {
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            add_bookmarks: false,
            preserve_metadata: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let MergeMode::Custom { order } = &self.mode {
            if order.iter().any(|r| r.page == 0) {
                return Err(invalid("page numbers start at 1"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    Low,
    #[default]
    Medium,
    High,
    Extreme,
}

impl CompressionLevel {
    /// `(image scale, JPEG quality)` for this level
    pub fn image_parameters(&self) -> (f32, u8) {
        match self {
            CompressionLevel::Low => (1.0, 85),
            CompressionLevel::Medium => (0.85, 70),
            CompressionLevel::High => (0.65, 50),
            CompressionLevel::Extreme => (0.45, 30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressOptions {
    #[serde(default)]
    pub compression_level: CompressionLevel,
    #[serde(default = "default_true")]
    pub optimize_images: bool,
    #[serde(default)]
    pub remove_metadata: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            compression_level: CompressionLevel::default(),
            optimize_images: true,
            remove_metadata: false,
        }
    }
}

impl CompressOptions {
    pub fn reencode_settings(&self) -> ReencodeSettings {
        let (scale, quality) = self.compression_level.image_parameters();
        ReencodeSettings {
            image_scale: self.optimize_images.then_some(scale),
            image_quality: quality,
            remove_metadata: self.remove_metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOptions {
    #[serde(default)]
    pub output_format: ImageFormat,
    #[serde(default = "default_dpi")]
    pub dpi: u32,
    #[serde(default)]
    pub color_mode: ColorMode,
    /// JPEG quality (1-100)
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Only these pages (1-indexed); every page when absent
    #[serde(default)]
    pub pages: Option<Vec<u32>>,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            output_format: ImageFormat::default(),
            dpi: default_dpi(),
            color_mode: ColorMode::default(),
            quality: default_quality(),
            pages: None,
        }
    }
}

impl ImageOptions {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DPI..=MAX_DPI).contains(&self.dpi) {
            return Err(invalid(format!(
                "dpi must be between {} and {}",
                MIN_DPI, MAX_DPI
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(invalid("quality must be between 1 and 100"));
        }
        if let Some(pages) = &self.pages {
            if pages.contains(&0) {
                return Err(invalid("page numbers start at 1"));
            }
        }
        Ok(())
    }

    /// Render scale relative to 72 dpi
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectOptions {
    pub user_password: String,
    #[serde(default)]
    pub owner_password: Option<String>,
    #[serde(default)]
    pub allow_print: PrintPermission,
    #[serde(default = "default_true")]
    pub allow_copy: bool,
    #[serde(default = "default_true")]
    pub allow_modify: bool,
}

impl ProtectOptions {
    pub fn validate(&self) -> Result<()> {
        if self.user_password.is_empty() {
            return Err(invalid("user_password must not be empty"));
        }
        if matches!(&self.owner_password, Some(p) if p.is_empty()) {
            return Err(invalid("owner_password must not be empty when given"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkOptions {
    #[serde(default)]
    pub text: Option<String>,
    /// Encoded image (PNG, JPEG, ...); supplied as a separate upload
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Fraction of the page width covered by an image watermark
    #[serde(default = "default_image_width")]
    pub image_width: f32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: None,
            image: None,
            opacity: default_opacity(),
            font_size: default_font_size(),
            image_width: default_image_width(),
        }
    }
}

impl WatermarkOptions {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let has_text = self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        let has_image = self.image.as_deref().is_some_and(|i| !i.is_empty());
        if !has_text && !has_image {
            return Err(invalid("watermark needs text or an image"));
        }
        if !(self.opacity > 0.0 && self.opacity <= 1.0) {
            return Err(invalid("opacity must be in (0, 1]"));
        }
        if !(self.font_size > 0.0 && self.font_size <= 500.0) {
            return Err(invalid("font_size must be in (0, 500]"));
        }
        if !(self.image_width > 0.0 && self.image_width <= 1.0) {
            return Err(invalid("image_width must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Options of any tool, tagged by tool name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolOptions {
    Split(SplitMode),
    Merge(MergeOptions),
    Compress(CompressOptions),
    ToImages(ImageOptions),
    Protect(ProtectOptions),
    Watermark(WatermarkOptions),
}

impl ToolOptions {
    pub fn validate(&self) -> Result<()> {
        match self {
            ToolOptions::Split(mode) => mode.validate(),
            ToolOptions::Merge(options) => options.validate(),
            ToolOptions::Compress(_) => Ok(()),
            ToolOptions::ToImages(options) => options.validate(),
            ToolOptions::Protect(options) => options.validate(),
            ToolOptions::Watermark(options) => options.validate(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dpi() -> u32 {
    150
}

fn default_quality() -> u8 {
    90
}

fn default_opacity() -> f32 {
    0.3
}

fn default_font_size() -> f32 {
    48.0
}

fn default_image_width() -> f32 {
    0.5
}
