//! Page selection state across the documents of a session

use crate::pipeline::document::{DocumentId, PageKey};
use std::collections::HashSet;

/// Order in which `SelectionModel::ordered_selection` enumerates keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrder {
    /// The order pages were toggled on (or dragged into)
    Insertion,
    /// Document order, then ascending page number
    Natural,
}

/// Insertion-ordered set of selected pages.
///
/// Storage keeps insertion order and is never re-sorted; `Natural` order is
/// computed on demand from the registered document order.
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    order: Vec<PageKey>,
    members: HashSet<PageKey>,
    documents: Vec<DocumentId>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document so natural order follows upload order
    pub fn register(&mut self, document: DocumentId) {
        if !self.documents.contains(&document) {
            self.documents.push(document);
        }
    }

    /// Replace the document order (after a drag-and-drop reorder)
    pub fn set_document_order(&mut self, order: &[DocumentId]) {
        let mut documents: Vec<DocumentId> = order.to_vec();
        for id in &self.documents {
            if !documents.contains(id) {
                documents.push(*id);
            }
        }
        self.documents = documents;
    }

    /// Drop a document from the model, including its selected pages
    pub fn forget(&mut self, document: DocumentId) {
        self.clear(document);
        self.documents.retain(|id| *id != document);
    }

    /// Flip membership of `key`
    pub fn toggle(&mut self, key: PageKey) {
        if self.members.remove(&key) {
            self.order.retain(|k| *k != key);
        } else {
            self.register(key.document);
            self.members.insert(key);
            self.order.push(key);
        }
    }

    /// Select every page of one document, appending unselected pages in
    /// page order
    pub fn select_all(&mut self, document: DocumentId, page_count: u32) {
        self.register(document);
        for page in 1..=page_count {
            let key = PageKey::new(document, page);
            if self.members.insert(key) {
                self.order.push(key);
            }
        }
    }

    /// Deselect every page of one document
    pub fn clear(&mut self, document: DocumentId) {
        self.order.retain(|k| k.document != document);
        self.members.retain(|k| k.document != document);
    }

    /// Deselect everything
    pub fn clear_all(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub fn is_selected(&self, key: &PageKey) -> bool {
        self.members.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Move a selected key to `index` in insertion order (drag reorder).
    /// Unselected keys are ignored; `index` is clamped.
    pub fn move_to(&mut self, key: PageKey, index: usize) {
        if let Some(pos) = self.order.iter().position(|k| *k == key) {
            let key = self.order.remove(pos);
            let index = index.min(self.order.len());
            self.order.insert(index, key);
        }
    }

    pub fn ordered_selection(&self, order: SelectionOrder) -> Vec<PageKey> {
        match order {
            SelectionOrder::Insertion => self.order.clone(),
            SelectionOrder::Natural => {
                let mut keys = self.order.clone();
                keys.sort_by_key(|k| (self.document_rank(k.document), k.page));
                keys
            }
        }
    }

    /// Selected page numbers of one document
    pub fn pages_for(&self, document: DocumentId, order: SelectionOrder) -> Vec<u32> {
        let mut pages: Vec<u32> = self
            .order
            .iter()
            .filter(|k| k.document == document)
            .map(|k| k.page)
            .collect();
        if order == SelectionOrder::Natural {
            pages.sort_unstable();
        }
        pages
    }

    fn document_rank(&self, document: DocumentId) -> usize {
        self.documents
            .iter()
            .position(|id| *id == document)
            .unwrap_or(self.documents.len())
    }
}
