//! PDF processing layer
//!
//! The `DocumentCodec` contract and its default implementation on top of
//! PDFium (rendering) and qpdf (structure).

mod codec;
mod qpdf;
mod render;

pub use codec::{
    Bookmark, ColorMode, ComposeSettings, DocumentCodec, ImageFormat, LoadedDocument, PageRef,
    PdfCodec, PrintPermission, ProtectSettings, Raster, ReencodeSettings, RenderSettings,
    RenderTarget, Stamp,
};
pub use qpdf::QpdfWrapper;
pub use render::{apply_color_mode, encode_image};

/// Cheap check run before handing bytes to a PDF library
pub(crate) fn has_pdf_header(data: &[u8]) -> bool {
    data.starts_with(b"%PDF")
}
