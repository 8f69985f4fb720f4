//! Split, merge, raster export and re-encoding of documents
//!
//! Every operation is all-or-nothing: it returns the complete set of
//! artifacts or an error, never a partial set.

use crate::error::{Error, Result};
use crate::pdf::{
    Bookmark, ComposeSettings, DocumentCodec, LoadedDocument, PageRef, ProtectSettings,
    RenderSettings, RenderTarget, Stamp,
};
use crate::pipeline::document::Document;
use crate::pipeline::options::{
    CompressOptions, ImageOptions, MergeMode, MergeOptions, ProtectOptions, SplitMode,
    WatermarkOptions,
};
use crate::pipeline::output::{Artifact, Completion};
use crate::pipeline::ranges::parse_page_groups;
use tracing::{debug, info, warn};

/// Output name of a merge
pub const MERGED_FILENAME: &str = "merged.pdf";

/// Inclusive page bounds of `parts` contiguous, near-equal parts of an
/// `n`-page document. The first `n % parts` parts hold one extra page.
pub fn equal_part_bounds(n: u32, parts: u32) -> Result<Vec<(u32, u32)>> {
    if parts < 2 {
        return Err(Error::InvalidOptions {
            reason: "equal_parts must be at least 2".to_string(),
        });
    }
    if parts > n {
        return Err(Error::InvalidOptions {
            reason: format!(
                "cannot split a {}-page document into {} parts",
                n, parts
            ),
        });
    }

    let base = n / parts;
    let extra = n % parts;
    let mut bounds = Vec::with_capacity(parts as usize);
    let mut start = 1;
    for i in 0..parts {
        let len = if i < extra { base + 1 } else { base };
        bounds.push((start, start + len - 1));
        start += len;
    }
    Ok(bounds)
}

/// All pages of each document in turn
pub fn sequential_plan(page_counts: &[u32]) -> Vec<PageRef> {
    page_counts
        .iter()
        .enumerate()
        .flat_map(|(source, &count)| (1..=count).map(move |page| PageRef::new(source, page)))
        .collect()
}

/// Page 1 of every document, then page 2 of every document, ...;
/// shorter documents drop out once exhausted
pub fn interleave_plan(page_counts: &[u32]) -> Vec<PageRef> {
    let longest = page_counts.iter().copied().max().unwrap_or(0);
    let mut plan = Vec::with_capacity(page_counts.iter().sum::<u32>() as usize);
    for page in 1..=longest {
        for (source, &count) in page_counts.iter().enumerate() {
            if page <= count {
                plan.push(PageRef::new(source, page));
            }
        }
    }
    plan
}

/// One outline entry per source, at the first output page drawn from it
fn source_bookmarks(docs: &[&Document], plan: &[PageRef]) -> Vec<Bookmark> {
    let mut bookmarks: Vec<Bookmark> = Vec::new();
    let mut seen = vec![false; docs.len()];
    for (index, page_ref) in plan.iter().enumerate() {
        if let Some(flag) = seen.get_mut(page_ref.source) {
            if !*flag {
                *flag = true;
                bookmarks.push(Bookmark {
                    title: docs[page_ref.source].stem().to_string(),
                    page: index as u32 + 1,
                });
            }
        }
    }
    bookmarks
}

/// Builds output documents from loaded sources through a codec
pub struct DocumentAssembler<'c> {
    codec: &'c dyn DocumentCodec,
    max_pixels: Option<u64>,
}

impl<'c> DocumentAssembler<'c> {
    pub fn new(codec: &'c dyn DocumentCodec) -> Self {
        Self {
            codec,
            max_pixels: None,
        }
    }

    /// Refuse raster exports whose pages exceed `max_pixels`
    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = Some(max_pixels);
        self
    }

    pub fn split(&self, doc: &Document, mode: &SplitMode) -> Result<Vec<Artifact>> {
        match mode {
            SplitMode::SelectedPages { pages } => self.split_selected(doc, pages),
            SplitMode::Ranges { ranges } => self.split_ranges(doc, ranges),
            SplitMode::EqualParts { equal_parts } => self.split_equal_parts(doc, *equal_parts),
        }
    }

    /// One single-page document per selected page, ascending
    pub fn split_selected(&self, doc: &Document, pages: &[u32]) -> Result<Vec<Artifact>> {
        if pages.is_empty() {
            return Err(Error::NoPagesSelected);
        }
        let mut pages = pages.to_vec();
        pages.sort_unstable();
        pages.dedup();
        doc.loaded().check_pages(&pages)?;

        let mut artifacts = Vec::with_capacity(pages.len());
        for page in pages {
            let data = self.codec.extract_pages(doc.loaded(), &[page])?;
            artifacts.push(Artifact::pdf(
                format!("{}_page_{}.pdf", doc.stem(), page),
                data,
            ));
        }
        info!(document = %doc.name(), outputs = artifacts.len(), "Split selected pages");
        Ok(artifacts)
    }

    /// One document per comma-separated group of `ranges`
    pub fn split_ranges(&self, doc: &Document, ranges: &str) -> Result<Vec<Artifact>> {
        let groups = parse_page_groups(ranges, doc.page_count())?;

        let mut artifacts = Vec::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            let data = self.codec.extract_pages(doc.loaded(), group)?;
            artifacts.push(Artifact::pdf(
                format!("{}_range_{}.pdf", doc.stem(), i + 1),
                data,
            ));
        }
        info!(document = %doc.name(), ranges = %ranges, outputs = artifacts.len(), "Split by ranges");
        Ok(artifacts)
    }

    /// `parts` contiguous documents covering every page exactly once
    pub fn split_equal_parts(&self, doc: &Document, parts: u32) -> Result<Vec<Artifact>> {
        let bounds = equal_part_bounds(doc.page_count(), parts)?;

        let mut artifacts = Vec::with_capacity(bounds.len());
        for (i, (start, end)) in bounds.iter().enumerate() {
            let pages: Vec<u32> = (*start..=*end).collect();
            let data = self.codec.extract_pages(doc.loaded(), &pages)?;
            artifacts.push(Artifact::pdf(
                format!("{}_part_{}_of_{}.pdf", doc.stem(), i + 1, parts),
                data,
            ));
        }
        info!(document = %doc.name(), parts, "Split into equal parts");
        Ok(artifacts)
    }

    /// Page order of a merge, checked against the documents
    pub fn merge_plan(&self, docs: &[&Document], mode: &MergeMode) -> Result<Vec<PageRef>> {
        if docs.len() < 2 {
            return Err(Error::InsufficientDocuments { got: docs.len() });
        }
        let counts: Vec<u32> = docs.iter().map(|d| d.page_count()).collect();

        match mode {
            MergeMode::Sequential => Ok(sequential_plan(&counts)),
            MergeMode::Interleave => Ok(interleave_plan(&counts)),
            MergeMode::Custom { order } => {
                if order.is_empty() {
                    return Err(Error::InvalidOptions {
                        reason: "custom merge order is empty".to_string(),
                    });
                }
                for page_ref in order {
                    let doc = docs.get(page_ref.source).ok_or_else(|| Error::InvalidOptions {
                        reason: format!("no document at index {}", page_ref.source),
                    })?;
                    doc.loaded().check_pages(&[page_ref.page])?;
                }
                Ok(order.clone())
            }
        }
    }

    /// Concatenate documents into one, ordered by `options.mode`
    pub fn merge(&self, docs: &[&Document], options: &MergeOptions) -> Result<Artifact> {
        let plan = self.merge_plan(docs, &options.mode)?;

        let settings = ComposeSettings {
            bookmarks: if options.add_bookmarks {
                source_bookmarks(docs, &plan)
            } else {
                Vec::new()
            },
            metadata_from: options.preserve_metadata.then_some(0),
        };
        let sources: Vec<&LoadedDocument> = docs.iter().map(|d| d.loaded()).collect();
        let data = self.codec.compose(&sources, &plan, &settings)?;

        info!(documents = docs.len(), pages = plan.len(), "Merged documents");
        Ok(Artifact::pdf(MERGED_FILENAME, data))
    }

    /// One image per page (or per listed page, ascending)
    pub fn extract_images(&self, doc: &Document, options: &ImageOptions) -> Result<Vec<Artifact>> {
        let pages: Vec<u32> = match &options.pages {
            Some(pages) if !pages.is_empty() => {
                let mut pages = pages.clone();
                pages.sort_unstable();
                pages.dedup();
                doc.loaded().check_pages(&pages)?;
                pages
            }
            _ => (1..=doc.page_count()).collect(),
        };

        let settings = RenderSettings {
            target: RenderTarget::Scale(options.scale()),
            format: options.output_format,
            color_mode: options.color_mode,
            quality: options.quality,
            max_pixels: self.max_pixels,
        };
        let rasters = self.codec.render_pages(doc.loaded(), &pages, &settings)?;

        let ext = options.output_format.extension();
        let artifacts: Vec<Artifact> = rasters
            .into_iter()
            .map(|raster| {
                Artifact::new(
                    format!("{}_page_{}.{}", doc.stem(), raster.page, ext),
                    raster.mime_type,
                    raster.data,
                )
            })
            .collect();
        info!(document = %doc.name(), dpi = options.dpi, images = artifacts.len(), "Rendered pages to images");
        Ok(artifacts)
    }

    pub fn compress(&self, doc: &Document, options: &CompressOptions) -> Result<Artifact> {
        let data = self.codec.reencode(doc.loaded(), &options.reencode_settings())?;
        info!(
            document = %doc.name(),
            level = ?options.compression_level,
            original = doc.byte_size(),
            compressed = data.len(),
            "Compressed document"
        );
        Ok(Artifact::pdf(format!("{}_compressed.pdf", doc.stem()), data))
    }

    pub fn protect(&self, doc: &Document, options: &ProtectOptions) -> Result<Artifact> {
        options.validate()?;
        let settings = ProtectSettings {
            user_password: options.user_password.clone(),
            owner_password: options.owner_password.clone(),
            allow_print: options.allow_print,
            allow_copy: options.allow_copy,
            allow_modify: options.allow_modify,
        };
        let data = self.codec.protect(doc.loaded(), &settings)?;
        info!(document = %doc.name(), "Protected document");
        Ok(Artifact::pdf(format!("{}_protected.pdf", doc.stem()), data))
    }

    /// Stamp every page. An undecodable image falls back to the text
    /// watermark when one is given, reported as `Completion::Fallback`.
    pub fn watermark(
        &self,
        doc: &Document,
        options: &WatermarkOptions,
    ) -> Result<(Artifact, Completion)> {
        options.validate()?;
        let (stamp, completion) = self.choose_stamp(options)?;
        let data = self.codec.watermark(doc.loaded(), &stamp)?;
        debug!(document = %doc.name(), fallback = completion != Completion::Full, "Watermarked document");
        Ok((
            Artifact::pdf(format!("{}_watermarked.pdf", doc.stem()), data),
            completion,
        ))
    }

    fn choose_stamp(&self, options: &WatermarkOptions) -> Result<(Stamp, Completion)> {
        let text_stamp = options
            .text
            .as_ref()
            .filter(|t| !t.trim().is_empty())
            .map(|text| Stamp::Text {
                text: text.clone(),
                font_size: options.font_size,
                opacity: options.opacity,
            });

        let Some(bytes) = options.image.as_deref().filter(|b| !b.is_empty()) else {
            return text_stamp
                .map(|stamp| (stamp, Completion::Full))
                .ok_or_else(|| Error::InvalidOptions {
                    reason: "watermark needs text or an image".to_string(),
                });
        };

        match image::load_from_memory(bytes) {
            Ok(image) => Ok((
                Stamp::Image {
                    image,
                    width_ratio: options.image_width,
                    opacity: options.opacity,
                },
                Completion::Full,
            )),
            Err(e) => match text_stamp {
                Some(stamp) => {
                    warn!(error = %e, "Watermark image unreadable, using text");
                    Ok((
                        stamp,
                        Completion::Fallback {
                            reason: "watermark image could not be decoded; text watermark applied"
                                .to_string(),
                        },
                    ))
                }
                None => Err(Error::InvalidOptions {
                    reason: format!("watermark image could not be decoded: {}", e),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::ImageFormat;
    use crate::testing::{memory_document, page_labels, CodecCall, MemoryCodec};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn open(codec: &MemoryCodec, name: &str, prefix: &str, pages: u32) -> Document {
        let loaded = codec.open(&memory_document(prefix, pages), None).unwrap();
        Document::new(name, loaded)
    }

    fn labels(artifacts: &[Artifact]) -> Vec<Vec<String>> {
        artifacts.iter().map(|a| page_labels(&a.data)).collect()
    }

    #[test]
    fn test_split_selected_sorts_pages() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "report.pdf", "A", 10);
        let artifacts = DocumentAssembler::new(&codec)
            .split_selected(&doc, &[3, 1, 7])
            .unwrap();

        let names: Vec<&str> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(
            names,
            vec!["report_page_1.pdf", "report_page_3.pdf", "report_page_7.pdf"]
        );
        assert_eq!(labels(&artifacts), vec![vec!["A1"], vec!["A3"], vec!["A7"]]);
    }

    #[test]
    fn test_split_selected_empty_makes_no_codec_calls() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "report.pdf", "A", 4);
        let before = codec.calls().len();

        let result = DocumentAssembler::new(&codec).split_selected(&doc, &[]);
        assert!(matches!(result, Err(Error::NoPagesSelected)));
        assert_eq!(codec.calls().len(), before);
    }

    #[test]
    fn test_split_selected_out_of_range() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "report.pdf", "A", 4);
        let result = DocumentAssembler::new(&codec).split_selected(&doc, &[2, 5]);
        assert!(matches!(
            result,
            Err(Error::PageOutOfBounds { page: 5, total: 4 })
        ));
        assert_eq!(codec.count(|c| matches!(c, CodecCall::Extract(_))), 0);
    }

    #[rstest]
    #[case(11, 3, vec![(1, 4), (5, 8), (9, 11)])]
    #[case(10, 2, vec![(1, 5), (6, 10)])]
    #[case(3, 3, vec![(1, 1), (2, 2), (3, 3)])]
    #[case(7, 4, vec![(1, 2), (3, 4), (5, 6), (7, 7)])]
    fn test_equal_part_bounds(
        #[case] n: u32,
        #[case] parts: u32,
        #[case] expected: Vec<(u32, u32)>,
    ) {
        assert_eq!(equal_part_bounds(n, parts).unwrap(), expected);
    }

    #[rstest]
    #[case(10, 1)]
    #[case(2, 3)]
    fn test_equal_part_bounds_rejects(#[case] n: u32, #[case] parts: u32) {
        assert!(matches!(
            equal_part_bounds(n, parts),
            Err(Error::InvalidOptions { .. })
        ));
    }

    #[test]
    fn test_equal_parts_cover_every_page_once() {
        for n in 2..40 {
            for parts in 2..=n {
                let bounds = equal_part_bounds(n, parts).unwrap();
                assert_eq!(bounds.len() as u32, parts);
                assert_eq!(bounds[0].0, 1);
                assert_eq!(bounds[bounds.len() - 1].1, n);
                for pair in bounds.windows(2) {
                    assert_eq!(pair[0].1 + 1, pair[1].0);
                }
                let sizes: Vec<u32> = bounds.iter().map(|(s, e)| e - s + 1).collect();
                let (min, max) = (sizes.iter().min().unwrap(), sizes.iter().max().unwrap());
                assert!(*min >= 1 && max - min <= 1);
            }
        }
    }

    #[test]
    fn test_split_equal_parts() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "book.pdf", "P", 11);
        let artifacts = DocumentAssembler::new(&codec)
            .split_equal_parts(&doc, 3)
            .unwrap();

        assert_eq!(artifacts[0].filename, "book_part_1_of_3.pdf");
        let sizes: Vec<usize> = labels(&artifacts).iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 3]);
        assert_eq!(labels(&artifacts)[2], vec!["P9", "P10", "P11"]);
    }

    #[test]
    fn test_split_ranges() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "book.pdf", "P", 6);
        let artifacts = DocumentAssembler::new(&codec)
            .split(&doc, &SplitMode::Ranges {
                ranges: "1-2, z, 5-3".to_string(),
            })
            .unwrap();

        assert_eq!(
            labels(&artifacts),
            vec![vec!["P1", "P2"], vec!["P6"], vec!["P5", "P4", "P3"]]
        );
        assert_eq!(artifacts[1].filename, "book_range_2.pdf");
    }

    #[test]
    fn test_split_is_atomic() {
        let codec = MemoryCodec::failing_extract_after(2);
        let doc = open(&codec, "book.pdf", "P", 10);
        let result = DocumentAssembler::new(&codec).split_equal_parts(&doc, 5);
        assert!(matches!(result, Err(Error::ProcessingFailed { .. })));
        assert_eq!(codec.count(|c| matches!(c, CodecCall::Extract(_))), 3);
    }

    #[test]
    fn test_merge_sequential_and_interleave() {
        let codec = MemoryCodec::new();
        let a = open(&codec, "a.pdf", "A", 3);
        let b = open(&codec, "b.pdf", "B", 2);
        let assembler = DocumentAssembler::new(&codec);

        let merged = assembler
            .merge(&[&a, &b], &MergeOptions::new(MergeMode::Sequential))
            .unwrap();
        assert_eq!(merged.filename, MERGED_FILENAME);
        assert_eq!(page_labels(&merged.data), vec!["A1", "A2", "A3", "B1", "B2"]);

        let merged = assembler
            .merge(&[&a, &b], &MergeOptions::new(MergeMode::Interleave))
            .unwrap();
        assert_eq!(page_labels(&merged.data), vec!["A1", "B1", "A2", "B2", "A3"]);
    }

    #[test]
    fn test_merge_custom_order() {
        let codec = MemoryCodec::new();
        let a = open(&codec, "a.pdf", "A", 3);
        let b = open(&codec, "b.pdf", "B", 2);
        let order = vec![PageRef::new(1, 2), PageRef::new(0, 3), PageRef::new(1, 1)];
        let merged = DocumentAssembler::new(&codec)
            .merge(&[&a, &b], &MergeOptions::new(MergeMode::Custom { order }))
            .unwrap();
        assert_eq!(page_labels(&merged.data), vec!["B2", "A3", "B1"]);
    }

    #[test]
    fn test_merge_custom_rejects_bad_refs() {
        let codec = MemoryCodec::new();
        let a = open(&codec, "a.pdf", "A", 3);
        let b = open(&codec, "b.pdf", "B", 2);
        let assembler = DocumentAssembler::new(&codec);

        let missing_doc = MergeMode::Custom {
            order: vec![PageRef::new(2, 1)],
        };
        assert!(matches!(
            assembler.merge_plan(&[&a, &b], &missing_doc),
            Err(Error::InvalidOptions { .. })
        ));
        let missing_page = MergeMode::Custom {
            order: vec![PageRef::new(1, 3)],
        };
        assert!(matches!(
            assembler.merge_plan(&[&a, &b], &missing_page),
            Err(Error::PageOutOfBounds { page: 3, total: 2 })
        ));
        assert_eq!(codec.count(|c| matches!(c, CodecCall::Compose(_))), 0);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn test_merge_needs_two_documents(#[case] count: usize) {
        let codec = MemoryCodec::new();
        let a = open(&codec, "a.pdf", "A", 3);
        let docs: Vec<&Document> = std::iter::repeat(&a).take(count).collect();
        let result =
            DocumentAssembler::new(&codec).merge(&docs, &MergeOptions::new(MergeMode::Sequential));
        assert!(matches!(
            result,
            Err(Error::InsufficientDocuments { got }) if got == count
        ));
    }

    #[test]
    fn test_bookmarks_point_at_first_page_of_each_source() {
        let codec = MemoryCodec::new();
        let a = open(&codec, "intro.pdf", "A", 2);
        let b = open(&codec, "body.pdf", "B", 2);
        let plan = interleave_plan(&[2, 2]);
        assert_eq!(
            source_bookmarks(&[&a, &b], &plan),
            vec![
                Bookmark {
                    title: "intro".to_string(),
                    page: 1
                },
                Bookmark {
                    title: "body".to_string(),
                    page: 2
                },
            ]
        );
    }

    #[test]
    fn test_interleave_plan_uneven() {
        let plan = interleave_plan(&[1, 3]);
        assert_eq!(
            plan,
            vec![
                PageRef::new(0, 1),
                PageRef::new(1, 1),
                PageRef::new(1, 2),
                PageRef::new(1, 3)
            ]
        );
    }

    #[test]
    fn test_extract_images_listed_pages() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 5);
        let options = ImageOptions {
            output_format: ImageFormat::Jpeg,
            pages: Some(vec![4, 2, 4]),
            ..ImageOptions::default()
        };
        let artifacts = DocumentAssembler::new(&codec)
            .extract_images(&doc, &options)
            .unwrap();

        let names: Vec<&str> = artifacts.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["scan_page_2.jpg", "scan_page_4.jpg"]);
        assert_eq!(artifacts[0].mime_type, "image/jpeg");
        assert!(codec.calls().contains(&CodecCall::Render(vec![2, 4])));
    }

    #[test]
    fn test_extract_images_all_pages() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 3);
        let artifacts = DocumentAssembler::new(&codec)
            .extract_images(&doc, &ImageOptions::default())
            .unwrap();
        assert_eq!(artifacts.len(), 3);
        assert_eq!(artifacts[2].filename, "scan_page_3.png");
    }

    #[test]
    fn test_compress_and_protect_names() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 1);
        let assembler = DocumentAssembler::new(&codec);

        let compressed = assembler.compress(&doc, &CompressOptions::default()).unwrap();
        assert_eq!(compressed.filename, "scan_compressed.pdf");

        let protect = ProtectOptions {
            user_password: "secret".to_string(),
            owner_password: None,
            allow_print: Default::default(),
            allow_copy: true,
            allow_modify: false,
        };
        let protected = assembler.protect(&doc, &protect).unwrap();
        assert_eq!(protected.filename, "scan_protected.pdf");
        assert_eq!(codec.count(|c| matches!(c, CodecCall::Protect)), 1);
    }

    #[test]
    fn test_watermark_text() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 2);
        let (artifact, completion) = DocumentAssembler::new(&codec)
            .watermark(&doc, &WatermarkOptions::text("DRAFT"))
            .unwrap();
        assert_eq!(completion, Completion::Full);
        assert_eq!(page_labels(&artifact.data), vec!["S1+text", "S2+text"]);
    }

    #[test]
    fn test_watermark_bad_image_falls_back_to_text() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 1);
        let options = WatermarkOptions {
            image: Some(b"not an image".to_vec()),
            ..WatermarkOptions::text("DRAFT")
        };
        let (artifact, completion) = DocumentAssembler::new(&codec)
            .watermark(&doc, &options)
            .unwrap();
        assert!(matches!(completion, Completion::Fallback { .. }));
        assert_eq!(page_labels(&artifact.data), vec!["S1+text"]);
    }

    #[test]
    fn test_watermark_bad_image_without_text_fails() {
        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 1);
        let options = WatermarkOptions {
            image: Some(b"not an image".to_vec()),
            ..WatermarkOptions::default()
        };
        let result = DocumentAssembler::new(&codec).watermark(&doc, &options);
        assert!(matches!(result, Err(Error::InvalidOptions { .. })));
        assert_eq!(codec.count(|c| matches!(c, CodecCall::Watermark)), 0);
    }

    #[test]
    fn test_watermark_image() {
        let mut png = Vec::new();
        image::DynamicImage::new_rgba8(4, 4)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let codec = MemoryCodec::new();
        let doc = open(&codec, "scan.pdf", "S", 1);
        let options = WatermarkOptions {
            image: Some(png),
            ..WatermarkOptions::default()
        };
        let (artifact, completion) = DocumentAssembler::new(&codec)
            .watermark(&doc, &options)
            .unwrap();
        assert_eq!(completion, Completion::Full);
        assert_eq!(page_labels(&artifact.data), vec!["S1+image"]);
    }
}
