//! One tool page: uploaded documents, their thumbnails, the page selection
//! and the operation run over them

use crate::error::{Error, Result};
use crate::pdf::{DocumentCodec, PageRef};
use crate::pipeline::{
    Artifact, BatchPackager, Completion, Document, DocumentAssembler, DocumentId,
    OperationResult, Output, Page, SelectionModel, SelectionOrder, SplitMode, ThumbnailExtractor,
    ToolOptions, DEFAULT_THUMBNAIL_WIDTH,
};
use crate::session::cache::ThumbnailCache;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Limits applied by a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub thumbnail_width: u16,
    /// Largest page area (pixels) a raster export may produce
    pub max_image_pixels: Option<u64>,
    pub thumbnail_cache_entries: usize,
    pub thumbnail_cache_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            max_image_pixels: Some(50_000_000),
            thumbnail_cache_entries: 32,
            thumbnail_cache_bytes: 64 * 1024 * 1024,
        }
    }
}

/// An uploaded file waiting to be opened
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
    pub password: Option<String>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Which documents a tool runs on, and how
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// Target documents in processing order; empty means every document
    /// in session order
    pub documents: Vec<DocumentId>,
    pub options: ToolOptions,
}

impl ToolRequest {
    pub fn new(documents: Vec<DocumentId>, options: ToolOptions) -> Self {
        Self { documents, options }
    }

    /// Run on every document of the session
    pub fn all(options: ToolOptions) -> Self {
        Self::new(Vec::new(), options)
    }
}

/// Owns the documents, thumbnails and selection of one tool page
pub struct ToolSession<'c> {
    codec: &'c dyn DocumentCodec,
    config: SessionConfig,
    documents: Vec<Document>,
    selection: SelectionModel,
    thumbnails: ThumbnailCache,
    packager: BatchPackager,
}

impl<'c> ToolSession<'c> {
    pub fn new(codec: &'c dyn DocumentCodec, config: SessionConfig) -> Self {
        let thumbnails =
            ThumbnailCache::new(config.thumbnail_cache_entries, config.thumbnail_cache_bytes);
        Self {
            codec,
            config,
            documents: Vec::new(),
            selection: SelectionModel::new(),
            thumbnails,
            packager: BatchPackager::new(),
        }
    }

    /// Open an upload and add it after the existing documents
    pub fn add_document(&mut self, upload: Upload) -> Result<DocumentId> {
        let loaded = self
            .codec
            .open(&upload.bytes, upload.password.as_deref())?;
        let document = Document::new(upload.name, loaded);
        let id = document.id();
        info!(
            document = %document.name(),
            id = %id,
            pages = document.page_count(),
            bytes = document.byte_size(),
            "Document added"
        );
        self.selection.register(id);
        self.documents.push(document);
        Ok(id)
    }

    /// Open several uploads; one failure does not affect the others
    pub fn add_documents(&mut self, uploads: Vec<Upload>) -> Vec<Result<DocumentId>> {
        uploads
            .into_iter()
            .map(|upload| {
                let name = upload.name.clone();
                self.add_document(upload).map_err(|e| {
                    warn!(document = %name, error = %e, "Upload rejected");
                    e
                })
            })
            .collect()
    }

    /// Drop a document together with its thumbnails and selected pages
    pub fn remove_document(&mut self, id: DocumentId) -> Result<()> {
        let index = self.index_of(id)?;
        self.documents.remove(index);
        self.selection.forget(id);
        self.thumbnails.remove(&id);
        debug!(id = %id, "Document removed");
        Ok(())
    }

    /// Reorder documents; ids not listed keep their relative order at the end
    pub fn reorder_documents(&mut self, order: &[DocumentId]) -> Result<()> {
        for id in order {
            self.index_of(*id)?;
        }
        let mut reordered = Vec::with_capacity(self.documents.len());
        for id in order {
            if let Some(pos) = self.documents.iter().position(|d| d.id() == *id) {
                reordered.push(self.documents.remove(pos));
            }
        }
        reordered.append(&mut self.documents);
        self.documents = reordered;

        let ids: Vec<DocumentId> = self.documents.iter().map(Document::id).collect();
        self.selection.set_document_order(&ids);
        Ok(())
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: DocumentId) -> Result<&Document> {
        self.documents
            .iter()
            .find(|d| d.id() == id)
            .ok_or_else(|| Error::DocumentNotFound { id: id.to_string() })
    }

    /// Rendered pages of a document, extracted on first use
    pub fn thumbnails(&self, id: DocumentId) -> Result<Vec<Page>> {
        if let Some(pages) = self.thumbnails.get(&id) {
            return Ok(pages);
        }
        self.refresh_thumbnails(id)
    }

    /// Re-extract the pages of a document, superseding cached ones
    pub fn refresh_thumbnails(&self, id: DocumentId) -> Result<Vec<Page>> {
        let document = self.document(id)?;
        let pages = ThumbnailExtractor::with_width(self.codec, self.config.thumbnail_width)
            .extract(document.loaded())?;
        self.thumbnails.put(id, pages.clone());
        Ok(pages)
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionModel {
        &mut self.selection
    }

    /// Select every page of a loaded document
    pub fn select_all(&mut self, id: DocumentId) -> Result<()> {
        let page_count = self.document(id)?.page_count();
        self.selection.select_all(id, page_count);
        Ok(())
    }

    /// Selected pages of one document, ascending
    pub fn selected_pages(&self, id: DocumentId) -> Vec<u32> {
        self.selection.pages_for(id, SelectionOrder::Natural)
    }

    /// Selected pages of `documents` in the order they were picked, as
    /// indices into `documents`
    pub fn custom_merge_order(&self, documents: &[DocumentId]) -> Vec<PageRef> {
        self.selection
            .ordered_selection(SelectionOrder::Insertion)
            .into_iter()
            .filter_map(|key| {
                documents
                    .iter()
                    .position(|id| *id == key.document)
                    .map(|source| PageRef::new(source, key.page))
            })
            .collect()
    }

    /// Split request over the current selection of one document
    pub fn split_selection_request(&self, id: DocumentId) -> ToolRequest {
        ToolRequest::new(
            vec![id],
            ToolOptions::Split(SplitMode::SelectedPages {
                pages: self.selected_pages(id),
            }),
        )
    }

    /// Run one tool operation. Errors are logged and reported in the
    /// result, never partially applied.
    pub fn run(&self, request: &ToolRequest) -> OperationResult {
        match self.try_run(request) {
            Ok((output, completion)) => {
                if let Completion::Fallback { reason } = &completion {
                    warn!(reason = %reason, "Operation completed with fallback");
                }
                OperationResult::ok(output, completion)
            }
            Err(e) => {
                warn!(error = %e, "Operation failed");
                OperationResult::failed(&e)
            }
        }
    }

    /// Like `run`, but keeps the typed error
    pub fn try_run(&self, request: &ToolRequest) -> Result<(Output, Completion)> {
        request.options.validate()?;
        let documents = self.targets(&request.documents)?;
        let mut assembler = DocumentAssembler::new(self.codec);
        if let Some(max_pixels) = self.config.max_image_pixels {
            assembler = assembler.with_max_pixels(max_pixels);
        }

        if let ToolOptions::Merge(options) = &request.options {
            let merged = assembler.merge(&documents, options)?;
            return Ok((Output::Single(merged), Completion::Full));
        }

        if documents.is_empty() {
            return Err(Error::InvalidOptions {
                reason: "no documents uploaded".to_string(),
            });
        }

        // Documents are processed one at a time; the first failure
        // discards everything produced so far
        let mut artifacts = Vec::new();
        let mut completion = Completion::Full;
        for document in &documents {
            let (produced, outcome) = run_one(&assembler, document, &request.options)?;
            if outcome != Completion::Full {
                completion = outcome;
            }
            artifacts.extend(produced);
        }

        if documents.len() > 1 {
            disambiguate_filenames(&mut artifacts);
        }
        Ok((Output::from_artifacts(artifacts)?, completion))
    }

    /// Collapse an output into one download
    pub fn download(&self, output: Output, archive_stem: &str) -> Result<Artifact> {
        output.into_download(&self.packager, archive_stem)
    }

    fn targets(&self, ids: &[DocumentId]) -> Result<Vec<&Document>> {
        if ids.is_empty() {
            return Ok(self.documents.iter().collect());
        }
        ids.iter().map(|id| self.document(*id)).collect()
    }

    fn index_of(&self, id: DocumentId) -> Result<usize> {
        self.documents
            .iter()
            .position(|d| d.id() == id)
            .ok_or_else(|| Error::DocumentNotFound { id: id.to_string() })
    }
}

fn run_one(
    assembler: &DocumentAssembler<'_>,
    document: &Document,
    options: &ToolOptions,
) -> Result<(Vec<Artifact>, Completion)> {
    let artifacts = match options {
        ToolOptions::Split(mode) => assembler.split(document, mode)?,
        ToolOptions::Compress(options) => vec![assembler.compress(document, options)?],
        ToolOptions::ToImages(options) => assembler.extract_images(document, options)?,
        ToolOptions::Protect(options) => vec![assembler.protect(document, options)?],
        ToolOptions::Watermark(options) => {
            let (artifact, completion) = assembler.watermark(document, options)?;
            return Ok((vec![artifact], completion));
        }
        ToolOptions::Merge(_) => {
            return Err(Error::InvalidOptions {
                reason: "merge combines documents and cannot run per document".to_string(),
            })
        }
    };
    Ok((artifacts, Completion::Full))
}

/// Suffix repeated names (`a.pdf`, `a_2.pdf`, ...) so every archive entry
/// is distinct
fn disambiguate_filenames(artifacts: &mut [Artifact]) {
    let mut seen: HashSet<String> = HashSet::new();
    for artifact in artifacts.iter_mut() {
        if seen.insert(artifact.filename.clone()) {
            continue;
        }
        let (stem, ext) = match artifact.filename.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), format!(".{}", ext)),
            None => (artifact.filename.clone(), String::new()),
        };
        let mut n = 2;
        let mut candidate = format!("{}_{}{}", stem, n, ext);
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}{}", stem, n, ext);
        }
        seen.insert(candidate.clone());
        artifact.filename = candidate;
    }
}
