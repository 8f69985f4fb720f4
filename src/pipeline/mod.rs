//! Page extraction and reconstruction pipeline
//!
//! Thumbnails are extracted from uploaded documents, pages are selected,
//! and the assembler produces new documents or images which the packager
//! bundles into a single download.

pub mod assembler;
pub mod document;
pub mod options;
pub mod output;
pub mod packager;
pub mod ranges;
pub mod selection;
pub mod thumbnail;

pub use assembler::{equal_part_bounds, interleave_plan, sequential_plan, DocumentAssembler};
pub use document::{Document, DocumentId, Page, PageKey};
pub use options::{
    CompressOptions, CompressionLevel, ImageOptions, MergeMode, MergeOptions, ProtectOptions,
    SplitMode, ToolOptions, WatermarkOptions,
};
pub use output::{Artifact, Completion, OperationResult, Output};
pub use packager::BatchPackager;
pub use ranges::parse_page_groups;
pub use selection::{SelectionModel, SelectionOrder};
pub use thumbnail::{ThumbnailExtractor, DEFAULT_THUMBNAIL_WIDTH};
