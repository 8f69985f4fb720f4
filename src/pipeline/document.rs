//! Uploaded documents, their pages and selection keys

use crate::pdf::{LoadedDocument, Raster};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Identifier generated for every upload.
///
/// Two uploads never share an id, even when their file names are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A loaded multi-page file plus its upload metadata
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    name: String,
    loaded: LoadedDocument,
}

impl Document {
    pub fn new(name: impl Into<String>, loaded: LoadedDocument) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            loaded,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name without a trailing `.pdf`, used to derive output names
    pub fn stem(&self) -> &str {
        let stem = Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        if stem.is_empty() {
            "document"
        } else {
            stem
        }
    }

    pub fn byte_size(&self) -> usize {
        self.loaded.bytes().len()
    }

    pub fn page_count(&self) -> u32 {
        self.loaded.page_count()
    }

    pub fn loaded(&self) -> &LoadedDocument {
        &self.loaded
    }
}

/// One rendered page of a document
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page number (1-indexed, matches source order)
    pub page_number: u32,
    /// Thumbnail width in pixels
    pub width: u32,
    /// Thumbnail height in pixels
    pub height: u32,
    pub thumbnail: Raster,
}

impl Page {
    /// Approximate heap footprint, used for cache budgeting
    pub fn byte_size(&self) -> usize {
        self.thumbnail.data.len()
    }
}

/// Addresses one page across every document of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey {
    pub document: DocumentId,
    pub page: u32,
}

impl PageKey {
    pub fn new(document: DocumentId, page: u32) -> Self {
        Self { document, page }
    }
}
