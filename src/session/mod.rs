//! Per-page tool state

pub mod cache;
pub mod tool;

pub use cache::ThumbnailCache;
pub use tool::{SessionConfig, ToolRequest, ToolSession, Upload};
