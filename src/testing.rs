//! Test support: a minimal PDF writer and an in-memory codec
//!
//! Kept in the library so integration tests and benches can share it.

use crate::error::{Error, Result};
use crate::pdf::{
    ComposeSettings, DocumentCodec, LoadedDocument, PageRef, ProtectSettings, Raster,
    ReencodeSettings, RenderSettings, Stamp,
};
use std::cell::RefCell;

/// Build a valid PDF with one page per `(width, height)` entry, in points.
///
/// Each page carries a filled rectangle so renderers have content to draw.
pub fn sample_pdf(sizes: &[(f32, f32)]) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::with_capacity(2 + sizes.len() * 2);
    let kids: Vec<String> = (0..sizes.len())
        .map(|i| format!("{} 0 R", 3 + i * 2))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        sizes.len()
    ));

    for (i, (width, height)) in sizes.iter().enumerate() {
        let content = format!(
            "0.2 0.4 0.8 rg 10 10 {} {} re f\n",
            width / 2.0,
            height / 2.0
        );
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Contents {} 0 R >>",
            width,
            height,
            4 + i * 2
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

const MEMORY_MAGIC: &str = "MEMPDF:";

/// Bytes of an in-memory document whose pages are labelled `{prefix}1..`
pub fn memory_document(prefix: &str, pages: u32) -> Vec<u8> {
    let labels: Vec<String> = (1..=pages).map(|p| format!("{}{}", prefix, p)).collect();
    encode_labels(&labels)
}

fn encode_labels<S: AsRef<str>>(labels: &[S]) -> Vec<u8> {
    let joined: Vec<&str> = labels.iter().map(|l| l.as_ref()).collect();
    format!("{}{}", MEMORY_MAGIC, joined.join(",")).into_bytes()
}

/// Page labels of a document produced by `MemoryCodec`
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix(MEMORY_MAGIC) {
        Some("") | None => Vec::new(),
        Some(rest) => rest.split(',').map(str::to_string).collect(),
    }
}

/// A codec call, as recorded by `MemoryCodec`
#[derive(Debug, Clone, PartialEq)]
pub enum CodecCall {
    Open,
    Render(Vec<u32>),
    Extract(Vec<u32>),
    Compose(Vec<PageRef>),
    Reencode,
    Protect,
    Watermark,
}

/// Codec whose documents are comma-separated page labels.
///
/// Every call is recorded so tests can assert which work was (or was not)
/// done; a failure can be injected after a number of extract calls.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    calls: RefCell<Vec<CodecCall>>,
    fail_extract_after: Option<usize>,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `n` extract calls succeed, then fail every following one
    pub fn failing_extract_after(n: usize) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_extract_after: Some(n),
        }
    }

    pub fn calls(&self) -> Vec<CodecCall> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls of the same kind as `probe`
    pub fn count(&self, probe: fn(&CodecCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| probe(c)).count()
    }

    fn record(&self, call: CodecCall) {
        self.calls.borrow_mut().push(call);
    }

    fn labels(doc: &LoadedDocument) -> Vec<String> {
        page_labels(doc.bytes())
    }
}

impl DocumentCodec for MemoryCodec {
    fn open(&self, bytes: &[u8], password: Option<&str>) -> Result<LoadedDocument> {
        self.record(CodecCall::Open);
        if !bytes.starts_with(MEMORY_MAGIC.as_bytes()) {
            return Err(Error::unreadable("not an in-memory document"));
        }
        let pages = page_labels(bytes).len() as u32;
        Ok(LoadedDocument::new(
            bytes.to_vec(),
            pages,
            password.map(str::to_string),
        ))
    }

    fn render_pages(
        &self,
        doc: &LoadedDocument,
        pages: &[u32],
        settings: &RenderSettings,
    ) -> Result<Vec<Raster>> {
        self.record(CodecCall::Render(pages.to_vec()));
        doc.check_pages(pages)?;
        let labels = Self::labels(doc);
        Ok(pages
            .iter()
            .map(|&page| Raster {
                page,
                width: 100,
                height: 140,
                data: labels[(page - 1) as usize].clone().into_bytes(),
                mime_type: settings.format.mime_type().to_string(),
            })
            .collect())
    }

    fn extract_pages(&self, doc: &LoadedDocument, pages: &[u32]) -> Result<Vec<u8>> {
        let done = self.count(|c| matches!(c, CodecCall::Extract(_)));
        self.record(CodecCall::Extract(pages.to_vec()));
        if matches!(self.fail_extract_after, Some(n) if done >= n) {
            return Err(Error::ProcessingFailed {
                reason: "injected extract failure".to_string(),
            });
        }
        doc.check_pages(pages)?;
        let labels = Self::labels(doc);
        let picked: Vec<&String> = pages
            .iter()
            .map(|&p| &labels[(p - 1) as usize])
            .collect();
        Ok(encode_labels(&picked))
    }

    fn compose(
        &self,
        sources: &[&LoadedDocument],
        plan: &[PageRef],
        _settings: &ComposeSettings,
    ) -> Result<Vec<u8>> {
        self.record(CodecCall::Compose(plan.to_vec()));
        let mut picked = Vec::with_capacity(plan.len());
        for page_ref in plan {
            let source = sources.get(page_ref.source).ok_or_else(|| Error::ProcessingFailed {
                reason: format!("missing source {}", page_ref.source),
            })?;
            source.check_pages(&[page_ref.page])?;
            picked.push(Self::labels(source)[(page_ref.page - 1) as usize].clone());
        }
        Ok(encode_labels(&picked))
    }

    fn reencode(&self, doc: &LoadedDocument, _settings: &ReencodeSettings) -> Result<Vec<u8>> {
        self.record(CodecCall::Reencode);
        Ok(doc.bytes().to_vec())
    }

    fn protect(&self, doc: &LoadedDocument, _settings: &ProtectSettings) -> Result<Vec<u8>> {
        self.record(CodecCall::Protect);
        Ok(doc.bytes().to_vec())
    }

    fn watermark(&self, doc: &LoadedDocument, stamp: &Stamp) -> Result<Vec<u8>> {
        self.record(CodecCall::Watermark);
        let suffix = match stamp {
            Stamp::Text { .. } => "+text",
            Stamp::Image { .. } => "+image",
        };
        let labels: Vec<String> = Self::labels(doc)
            .into_iter()
            .map(|l| format!("{}{}", l, suffix))
            .collect();
        Ok(encode_labels(&labels))
    }
}
