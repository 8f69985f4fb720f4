//! Page thumbnail extraction

use crate::error::{Error, Result};
use crate::pdf::{DocumentCodec, LoadedDocument, RenderSettings};
use crate::pipeline::document::Page;

/// Default thumbnail width in pixels
pub const DEFAULT_THUMBNAIL_WIDTH: u16 = 200;

/// Pages rendered per codec call when progress is reported
const PROGRESS_CHUNK: usize = 8;

/// Renders every page of a document to a preview image
pub struct ThumbnailExtractor<'c> {
    codec: &'c dyn DocumentCodec,
    settings: RenderSettings,
}

impl<'c> ThumbnailExtractor<'c> {
    pub fn new(codec: &'c dyn DocumentCodec) -> Self {
        Self::with_width(codec, DEFAULT_THUMBNAIL_WIDTH)
    }

    pub fn with_width(codec: &'c dyn DocumentCodec, width: u16) -> Self {
        Self {
            codec,
            settings: RenderSettings::thumbnail(width.max(1)),
        }
    }

    /// One `Page` per source page, in page order
    pub fn extract(&self, doc: &LoadedDocument) -> Result<Vec<Page>> {
        let all: Vec<u32> = (1..=doc.page_count()).collect();
        let rasters = self.codec.render_pages(doc, &all, &self.settings)?;
        let pages = rasters
            .into_iter()
            .map(|raster| Page {
                page_number: raster.page,
                width: raster.width,
                height: raster.height,
                thumbnail: raster,
            })
            .collect();
        check_sequence(pages, doc.page_count())
    }

    /// Like `extract`, rendering in chunks and calling `progress(done, total)`
    /// after each chunk
    pub fn extract_with_progress<F>(&self, doc: &LoadedDocument, mut progress: F) -> Result<Vec<Page>>
    where
        F: FnMut(u32, u32),
    {
        let total = doc.page_count();
        let all: Vec<u32> = (1..=total).collect();
        let mut pages = Vec::with_capacity(all.len());

        for chunk in all.chunks(PROGRESS_CHUNK) {
            let rasters = self.codec.render_pages(doc, chunk, &self.settings)?;
            pages.extend(rasters.into_iter().map(|raster| Page {
                page_number: raster.page,
                width: raster.width,
                height: raster.height,
                thumbnail: raster,
            }));
            progress(pages.len() as u32, total);
        }

        check_sequence(pages, total)
    }
}

/// Codec output must be exactly pages `1..=page_count` in order
fn check_sequence(pages: Vec<Page>, page_count: u32) -> Result<Vec<Page>> {
    let in_order = pages
        .iter()
        .enumerate()
        .all(|(i, page)| page.page_number == i as u32 + 1);
    if pages.len() as u32 != page_count || !in_order {
        return Err(Error::ProcessingFailed {
            reason: format!(
                "renderer returned {} pages for a {}-page document",
                pages.len(),
                page_count
            ),
        });
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_document, CodecCall, MemoryCodec};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_returns_every_page_in_order() {
        let codec = MemoryCodec::new();
        let doc = codec.open(&memory_document("A", 12), None).unwrap();
        let pages = ThumbnailExtractor::new(&codec).extract(&doc).unwrap();

        let numbers: Vec<u32> = pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<u32>>());
        assert_eq!(pages[0].thumbnail.data, b"A1".to_vec());
        assert_eq!(pages[0].width, 100);
    }

    #[test]
    fn test_extract_with_progress_reports_chunks() {
        let codec = MemoryCodec::new();
        let doc = codec.open(&memory_document("A", 10), None).unwrap();
        let mut reports = Vec::new();
        let pages = ThumbnailExtractor::new(&codec)
            .extract_with_progress(&doc, |done, total| reports.push((done, total)))
            .unwrap();

        assert_eq!(pages.len(), 10);
        assert_eq!(reports, vec![(8, 10), (10, 10)]);
        assert_eq!(
            codec.count(|c| matches!(c, CodecCall::Render(_))),
            2
        );
    }

    #[test]
    fn test_unreadable_document() {
        let codec = MemoryCodec::new();
        assert!(matches!(
            codec.open(b"garbage", None),
            Err(Error::DocumentUnreadable { .. })
        ));
    }

    #[test]
    fn test_check_sequence_rejects_gaps() {
        let codec = MemoryCodec::new();
        let doc = codec.open(&memory_document("A", 3), None).unwrap();
        let mut pages = ThumbnailExtractor::new(&codec).extract(&doc).unwrap();
        pages.remove(1);
        assert!(check_sequence(pages, 3).is_err());
    }
}
