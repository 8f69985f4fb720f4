//! pagesmith
//!
//! PDF page extraction and reconstruction:
//! - thumbnails of every page of uploaded documents
//! - page selection across documents
//! - split, merge, compress, protect and watermark
//! - export of pages as PNG, JPEG or WebP images
//! - ZIP packaging of multi-file results
//!
//! The pipeline runs on any `pdf::DocumentCodec`; `server` exposes it over
//! HTTP.

pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod server;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result, UnreadableKind};
pub use pipeline::{
    Artifact, BatchPackager, Completion, Document, DocumentAssembler, DocumentId, OperationResult,
    Output, Page, PageKey, SelectionModel, SelectionOrder, ThumbnailExtractor, ToolOptions,
};
pub use server::{router, run_server_with_config, ServerConfig};
pub use session::{SessionConfig, ToolRequest, ToolSession, Upload};
